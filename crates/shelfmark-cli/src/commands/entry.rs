//! Entry command handlers
//!
//! While the user is a guest, entries live in the local store with an
//! embedded media snapshot. Once authenticated, the server is
//! authoritative and the same commands go through the API.

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use shelfmark_core::models::{CreateEntryRequest, CreateMediaRequest};
use shelfmark_core::{ApiClient, AuthState, Entry, EntryPatch, GuestStore, MediaItem, MediaType, Status};

use crate::output::Output;

/// Track a new media item
#[allow(clippy::too_many_arguments)]
pub async fn add(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    title: String,
    media_type: MediaType,
    status: Status,
    year: Option<i32>,
    rating: Option<i32>,
    output: &Output,
) -> Result<()> {
    if let Some(token) = state.token() {
        let media_request = CreateMediaRequest {
            media_type,
            title: title.clone(),
            original_title: None,
            year,
            cover_url: None,
            creators: None,
            genres: None,
            duration: None,
            metadata: None,
        };
        let media = api
            .create_media(&media_request, token)
            .await
            .context("Failed to create media item")?;

        let entry_request = CreateEntryRequest {
            media_id: media.id,
            status,
            rating,
            review_md: None,
            progress: None,
            started_at: None,
            finished_at: None,
        };
        let mut entry = api
            .create_entry(&entry_request, token)
            .await
            .context("Failed to create entry")?;
        if entry.media.is_none() {
            entry.media = Some(media);
        }

        output.success(&format!("Created entry: {}", entry.id));
        output.print_entry(&entry);
        return Ok(());
    }

    let mut media = MediaItem::new(media_type, title);
    media.year = year;

    let mut entry = Entry::new(media.id, status);
    entry.rating = rating;

    store
        .add_entry(&entry, &media)
        .context("Failed to add entry")?;

    output.success(&format!("Created entry: {}", entry.id));
    output.print_entry(&store.get_entry(entry.id).expect("entry was just added"));

    Ok(())
}

/// List entries, optionally filtered by type and status
pub async fn list(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    media_type: Option<MediaType>,
    status: Option<Status>,
    output: &Output,
) -> Result<()> {
    let entries = match state.token() {
        Some(token) => api
            .list_entries(token, media_type, status)
            .await
            .context("Failed to list entries")?,
        None => store
            .entries()
            .into_iter()
            .filter(|e| {
                media_type.map_or(true, |t| {
                    e.media.as_ref().map_or(false, |m| m.media_type == t)
                })
            })
            .filter(|e| status.map_or(true, |s| e.status == s))
            .collect(),
    };

    output.print_entries(&entries);
    Ok(())
}

/// Show a single entry
pub fn show(store: &GuestStore, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_entry_id(store, &id)?;
    let entry = store
        .get_entry(uuid)
        .ok_or_else(|| anyhow::anyhow!("Entry not found: {}", id))?;

    output.print_entry(&entry);
    Ok(())
}

/// Update an entry's status, rating, or review
pub async fn update(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    id: String,
    status: Option<Status>,
    rating: Option<i32>,
    review: Option<String>,
    output: &Output,
) -> Result<()> {
    let patch = EntryPatch {
        status,
        rating,
        review_md: review,
        ..Default::default()
    };

    if let Some(token) = state.token() {
        let uuid: Uuid = id.parse().context("Invalid entry id")?;
        let entry = api
            .update_entry(uuid, &patch, token)
            .await
            .context("Failed to update entry")?;
        output.success("Updated entry");
        output.print_entry(&entry);
        return Ok(());
    }

    let uuid = resolve_entry_id(store, &id)?;
    // The store ignores absent ids; check first so the user gets feedback
    if !store.contains_entry(uuid) {
        bail!("Entry not found: {}", id);
    }
    store
        .update_entry(uuid, patch)
        .context("Failed to update entry")?;

    output.success("Updated entry");
    output.print_entry(&store.get_entry(uuid).expect("entry exists"));
    Ok(())
}

/// Remove an entry
pub async fn remove(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    id: String,
    output: &Output,
) -> Result<()> {
    if let Some(token) = state.token() {
        let uuid: Uuid = id.parse().context("Invalid entry id")?;
        api.delete_entry(uuid, token)
            .await
            .context("Failed to delete entry")?;
        output.success(&format!("Removed entry: {}", uuid));
        return Ok(());
    }

    let uuid = resolve_entry_id(store, &id)?;
    if !store.contains_entry(uuid) {
        bail!("Entry not found: {}", id);
    }
    store
        .remove_entry(uuid)
        .context("Failed to remove entry")?;

    output.success(&format!("Removed entry: {}", uuid));
    Ok(())
}

/// Resolve a full UUID or unique prefix to an entry id in the guest store
fn resolve_entry_id(store: &GuestStore, id: &str) -> Result<Uuid> {
    if let Ok(uuid) = id.parse::<Uuid>() {
        return Ok(uuid);
    }

    let matches: Vec<Uuid> = store
        .entries()
        .iter()
        .map(|e| e.id)
        .filter(|eid| eid.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("Entry not found: {}", id),
        1 => Ok(matches[0]),
        n => bail!("Ambiguous id prefix '{}' matches {} entries", id, n),
    }
}
