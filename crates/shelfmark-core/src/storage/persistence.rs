//! Guest data persistence
//!
//! Handles saving and loading the guest aggregate, device id, and auth
//! session to/from the filesystem. Uses atomic writes (write to temp file,
//! then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/shelfmark/` (configurable via `Config`)
//!
//! Files:
//! - `guest_store.json` - The guest aggregate (entries + collections)
//! - `device_id`        - The anonymous device identifier
//! - `session.json`     - The authenticated session, when logged in
//!
//! The substrate only supports whole-aggregate read and whole-aggregate
//! write; partial-field consistency is the store's responsibility.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::warn;
use uuid::Uuid;

use super::error::StorageResult;
use crate::auth::Session;
use crate::config::Config;
use crate::store::StoreData;

/// Persistence layer for guest-local data
///
/// Provides atomic file operations for the three persisted values. Reads of
/// malformed data degrade to "nothing stored" and are logged, never raised.
pub struct GuestPersistence {
    config: Config,
}

impl GuestPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Aggregate ====================

    /// Check if an aggregate exists on disk
    pub fn exists(&self) -> bool {
        self.config.store_path().exists()
    }

    /// Load the guest aggregate
    ///
    /// Returns an empty aggregate if the file doesn't exist or holds
    /// malformed data. Malformed data is a recoverable condition: it is
    /// logged and the caller proceeds with an empty store.
    pub fn load_aggregate(&self) -> StoreData {
        let path = self.config.store_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return StoreData::default();
            }
            Err(err) => {
                warn!(?path, %err, "failed to read guest store, starting empty");
                return StoreData::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(err) => {
                warn!(?path, %err, "guest store is malformed, starting empty");
                StoreData::default()
            }
        }
    }

    /// Save the guest aggregate, replacing any prior value
    pub fn save_aggregate(&self, data: &StoreData) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(data)?;
        atomic_write(&self.config.store_path(), &bytes)
    }

    /// Delete the guest aggregate file
    pub fn clear_aggregate(&self) -> StorageResult<()> {
        remove_if_exists(&self.config.store_path())
    }

    // ==================== Device id ====================

    /// Load the device id
    ///
    /// Returns `None` if the id file doesn't exist or is malformed. A
    /// malformed id is logged and discarded; the caller regenerates.
    pub fn load_device_id(&self) -> Option<Uuid> {
        let path = self.config.device_id_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(?path, %err, "failed to read device id");
                return None;
            }
        };

        match content.trim().parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(?path, %err, "device id is malformed, discarding");
                None
            }
        }
    }

    /// Save the device id
    pub fn save_device_id(&self, id: &Uuid) -> StorageResult<()> {
        atomic_write(&self.config.device_id_path(), id.to_string().as_bytes())
    }

    /// Delete the device id file
    pub fn clear_device_id(&self) -> StorageResult<()> {
        remove_if_exists(&self.config.device_id_path())
    }

    // ==================== Session ====================

    /// Load the authenticated session
    ///
    /// Returns `None` if no session is stored. A malformed session file is
    /// removed and treated as logged out.
    pub fn load_session(&self) -> Option<Session> {
        let path = self.config.session_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(?path, %err, "failed to read session");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(?path, %err, "session is malformed, logging out");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// Save the authenticated session
    pub fn save_session(&self, session: &Session) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(session)?;
        atomic_write(&self.config.session_path(), &bytes)
    }

    /// Delete the session file
    pub fn clear_session(&self) -> StorageResult<()> {
        remove_if_exists(&self.config.session_path())
    }

    /// Delete all stored data
    ///
    /// Removes the aggregate, device id, and session. Use with caution!
    pub fn delete_all(&self) -> StorageResult<()> {
        self.clear_aggregate()?;
        self.clear_device_id()?;
        self.clear_session()?;
        Ok(())
    }
}

/// Remove a file if it exists
fn remove_if_exists(path: &Path) -> StorageResult<()> {
    if path.exists() {
        fs::remove_file(path)
            .map_err(|err| super::error::StorageError::from_io(err, path.to_path_buf()))?;
    }
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    use super::error::StorageError;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|err| StorageError::from_io(err, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|err| StorageError::from_io(err, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|err| StorageError::from_io(err, temp_path.clone()))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
