//! Snapshot serialization
//!
//! Converts the guest aggregate plus device identity into a textual export
//! (backup/download), reverses the operation (import), and projects the
//! aggregate into the request payload used to mint a public read-only
//! share.
//!
//! Import is all-or-nothing: the text is parsed in full before any local
//! state is touched, so a malformed snapshot leaves the existing aggregate
//! and device identity intact.

use thiserror::Error;
use tracing::debug;

use crate::models::{GuestSnapshotRequest, MediaItem};
use crate::store::{GuestData, GuestStore, StoreError};

/// Errors that can occur during snapshot import/export
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot text is not a valid guest data document
    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The parsed snapshot could not be written to local storage
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serialize the full guest aggregate (device id + entries + collections)
/// to a self-describing JSON document
pub fn export_data(store: &GuestStore) -> Result<String, SnapshotError> {
    let data = store.guest_data();
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Parse a snapshot and replace the local aggregate and device identity
///
/// On any parse failure no mutation is made to existing local state.
pub fn import_data(store: &GuestStore, text: &str) -> Result<(), SnapshotError> {
    // Parse first; only a fully valid document replaces local state.
    let data: GuestData = serde_json::from_str(text)?;

    debug!(
        entries = data.entries.len(),
        collections = data.collections.len(),
        "importing snapshot"
    );
    store.set_guest_data(data)?;
    Ok(())
}

/// Build the request payload for the public share endpoint
///
/// A read-only projection: the entries plus the set of referenced media
/// items, deduplicated by id. No local side effect.
pub fn snapshot_request(store: &GuestStore) -> GuestSnapshotRequest {
    let entries = store.entries();

    let mut media: Vec<MediaItem> = Vec::new();
    for entry in &entries {
        if let Some(item) = &entry.media {
            if !media.iter().any(|m| m.id == item.id) {
                media.push(item.clone());
            }
        }
    }

    GuestSnapshotRequest { entries, media }
}
