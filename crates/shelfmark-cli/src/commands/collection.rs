//! Collection command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use shelfmark_core::models::CreateCollectionRequest;
use shelfmark_core::{ApiClient, AuthState, Collection, CollectionPatch, GuestStore};

use crate::output::Output;

/// Create a collection
pub async fn create(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    title: String,
    public: bool,
    output: &Output,
) -> Result<()> {
    if let Some(token) = state.token() {
        let request = CreateCollectionRequest {
            title,
            is_public: public,
            entry_ids: None,
        };
        let collection = api
            .create_collection(&request, token)
            .await
            .context("Failed to create collection")?;
        output.success(&format!("Created collection: {}", collection.id));
        return Ok(());
    }

    let mut collection = Collection::new(title);
    collection.is_public = public;
    store
        .add_collection(&collection)
        .context("Failed to create collection")?;

    output.success(&format!("Created collection: {}", collection.id));
    Ok(())
}

/// List collections
pub async fn list(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    output: &Output,
) -> Result<()> {
    let collections = match state.token() {
        Some(token) => api
            .list_collections(token)
            .await
            .context("Failed to list collections")?,
        None => store.collections(),
    };

    output.print_collections(&collections);
    Ok(())
}

/// Rename a collection
pub async fn rename(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    id: String,
    title: String,
    output: &Output,
) -> Result<()> {
    let uuid: Uuid = id.parse().context("Invalid collection id")?;
    let patch = CollectionPatch {
        title: Some(title),
        is_public: None,
        entries: None,
    };

    if let Some(token) = state.token() {
        api.update_collection(uuid, &patch, token)
            .await
            .context("Failed to update collection")?;
    } else {
        if !store.contains_collection(uuid) {
            bail!("Collection not found: {}", id);
        }
        store
            .update_collection(uuid, patch)
            .context("Failed to update collection")?;
    }

    output.success("Renamed collection");
    Ok(())
}

/// Remove a collection
pub async fn remove(
    store: &GuestStore,
    api: &ApiClient,
    state: &AuthState,
    id: String,
    output: &Output,
) -> Result<()> {
    let uuid: Uuid = id.parse().context("Invalid collection id")?;

    if let Some(token) = state.token() {
        api.delete_collection(uuid, token)
            .await
            .context("Failed to delete collection")?;
    } else {
        if !store.contains_collection(uuid) {
            bail!("Collection not found: {}", id);
        }
        store
            .remove_collection(uuid)
            .context("Failed to remove collection")?;
    }

    output.success(&format!("Removed collection: {}", uuid));
    Ok(())
}

/// Mint a public share link for a collection (requires login)
pub async fn share(
    api: &ApiClient,
    state: &AuthState,
    id: String,
    output: &Output,
) -> Result<()> {
    let Some(token) = state.token() else {
        bail!("Sharing a collection requires login. Use 'shelfmark share' to share your guest library instead.");
    };

    let uuid: Uuid = id.parse().context("Invalid collection id")?;
    let share = api
        .share_collection(uuid, token)
        .await
        .context("Failed to share collection")?;

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&share)?);
    } else {
        println!("{}", share.share_url);
    }
    Ok(())
}
