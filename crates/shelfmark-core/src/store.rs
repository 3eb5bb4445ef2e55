//! Guest record store
//!
//! The `GuestStore` owns all client-resident tracking data while the user
//! is unauthenticated. Every mutator is a whole-aggregate
//! read-modify-write: the substrate has no partial-update primitive, so a
//! mutation loads the aggregate, changes it in memory, and writes it back
//! in one synchronous step with no suspension point in between. Two
//! mutations in one execution context therefore apply in invocation order
//! with no interleaving.
//!
//! The store is an explicitly constructed object, not a process-wide
//! singleton, so tests stay hermetic.
//!
//! ## Usage
//!
//! ```ignore
//! let store = GuestStore::open()?;
//!
//! let media = MediaItem::new(MediaType::Book, "Dune");
//! let entry = Entry::new(media.id, Status::Planned);
//! store.add_entry(&entry, &media)?;
//!
//! let entries = store.entries();
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::identity::{DeviceId, DeviceIdentity};
use crate::models::{Collection, CollectionPatch, Entry, EntryPatch, MediaItem, MediaPatch};
use crate::storage::{GuestPersistence, StorageError};

/// The persisted aggregate: entries plus collections
///
/// This is the single value stored under the aggregate key. A store
/// without collections is just this shape with an empty list, not a
/// separate code path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// The full local state unit: device id plus aggregate
///
/// This is the unit of export, import, and merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestData {
    #[serde(rename = "guestId")]
    pub guest_id: DeviceId,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// Errors signaled at the mutator boundary
#[derive(Error, Debug)]
pub enum StoreError {
    /// An entry with this id already exists
    #[error("Entry {0} already exists")]
    DuplicateEntry(Uuid),

    /// A collection with this id already exists
    #[error("Collection {0} already exists")]
    DuplicateCollection(Uuid),

    /// The entry's media_id does not match the attached media item
    #[error("Entry media_id {entry_media_id} does not match media item {media_id}")]
    MediaIdMismatch { entry_media_id: Uuid, media_id: Uuid },

    /// Persistence failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Local-first store for guest tracking data
///
/// Owns the aggregate key; the device-id key is owned by the wrapped
/// `DeviceIdentity`. No other component writes either.
pub struct GuestStore {
    persistence: GuestPersistence,
    identity: DeviceIdentity,
}

impl GuestStore {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::with_config(config))
    }

    /// Open the store with a specific configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            persistence: GuestPersistence::new(config.clone()),
            identity: DeviceIdentity::new(config),
        }
    }

    /// Get the device identity resolver
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Get the stable device id, generating one on first use
    pub fn device_id(&self) -> DeviceId {
        self.identity.get_or_create()
    }

    /// Read the current aggregate
    ///
    /// Degrades to an empty aggregate if the substrate is unreadable or
    /// holds malformed data.
    pub fn read(&self) -> StoreData {
        self.persistence.load_aggregate()
    }

    /// Persist the full aggregate, replacing any prior value
    pub fn write(&self, data: &StoreData) -> Result<(), StoreError> {
        self.persistence.save_aggregate(data)?;
        Ok(())
    }

    // ==================== Entry Operations ====================

    /// Add a new entry with its embedded media snapshot
    ///
    /// Rejects an id collision rather than storing two records with the
    /// same identifier, and rejects an entry whose `media_id` does not
    /// match the media item.
    pub fn add_entry(&self, entry: &Entry, media: &MediaItem) -> Result<(), StoreError> {
        if entry.media_id != media.id {
            return Err(StoreError::MediaIdMismatch {
                entry_media_id: entry.media_id,
                media_id: media.id,
            });
        }

        let mut data = self.read();
        if data.entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }

        let mut entry = entry.clone();
        entry.media = Some(media.clone());
        data.entries.push(entry);
        self.write(&data)
    }

    /// Apply a partial update to the entry with the given id
    ///
    /// Fields the patch leaves unset are retained. Updating an absent id
    /// is a silent no-op; callers that need to know use `contains_entry`.
    pub fn update_entry(&self, id: Uuid, patch: EntryPatch) -> Result<(), StoreError> {
        let mut data = self.read();
        if let Some(entry) = data.entries.iter_mut().find(|e| e.id == id) {
            entry.apply(patch);
            self.write(&data)?;
        }
        Ok(())
    }

    /// Remove the entry with the given id
    ///
    /// Removing an absent id is a silent no-op.
    pub fn remove_entry(&self, id: Uuid) -> Result<(), StoreError> {
        let mut data = self.read();
        data.entries.retain(|e| e.id != id);
        self.write(&data)
    }

    /// Get an entry by id
    pub fn get_entry(&self, id: Uuid) -> Option<Entry> {
        self.read().entries.into_iter().find(|e| e.id == id)
    }

    /// Check whether an entry with the given id exists
    pub fn contains_entry(&self, id: Uuid) -> bool {
        self.read().entries.iter().any(|e| e.id == id)
    }

    /// Get all entries
    pub fn entries(&self) -> Vec<Entry> {
        self.read().entries
    }

    /// Get count of entries
    pub fn entry_count(&self) -> usize {
        self.read().entries.len()
    }

    /// Remove all entries, keeping collections
    pub fn clear_entries(&self) -> Result<(), StoreError> {
        let mut data = self.read();
        data.entries.clear();
        self.write(&data)
    }

    // ==================== Media Operations ====================

    /// Find the embedded media snapshot with the given id
    pub fn get_media(&self, id: Uuid) -> Option<MediaItem> {
        self.read()
            .entries
            .into_iter()
            .find_map(|e| e.media.filter(|m| m.id == id))
    }

    /// Apply a partial update to every embedded media snapshot matching id
    pub fn update_media(&self, id: Uuid, patch: MediaPatch) -> Result<(), StoreError> {
        let mut data = self.read();
        for entry in data.entries.iter_mut() {
            if let Some(media) = entry.media.as_mut() {
                if media.id == id {
                    media.apply(patch.clone());
                }
            }
        }
        self.write(&data)
    }

    // ==================== Collection Operations ====================

    /// Add a new collection
    pub fn add_collection(&self, collection: &Collection) -> Result<(), StoreError> {
        let mut data = self.read();
        if data.collections.iter().any(|c| c.id == collection.id) {
            return Err(StoreError::DuplicateCollection(collection.id));
        }
        data.collections.push(collection.clone());
        self.write(&data)
    }

    /// Apply a partial update to the collection with the given id
    ///
    /// Updating an absent id is a silent no-op.
    pub fn update_collection(&self, id: Uuid, patch: CollectionPatch) -> Result<(), StoreError> {
        let mut data = self.read();
        if let Some(collection) = data.collections.iter_mut().find(|c| c.id == id) {
            collection.apply(patch);
            self.write(&data)?;
        }
        Ok(())
    }

    /// Remove the collection with the given id
    ///
    /// Removing an absent id is a silent no-op.
    pub fn remove_collection(&self, id: Uuid) -> Result<(), StoreError> {
        let mut data = self.read();
        data.collections.retain(|c| c.id != id);
        self.write(&data)
    }

    /// Get a collection by id
    pub fn get_collection(&self, id: Uuid) -> Option<Collection> {
        self.read().collections.into_iter().find(|c| c.id == id)
    }

    /// Check whether a collection with the given id exists
    pub fn contains_collection(&self, id: Uuid) -> bool {
        self.read().collections.iter().any(|c| c.id == id)
    }

    /// Get all collections
    pub fn collections(&self) -> Vec<Collection> {
        self.read().collections
    }

    // ==================== Guest Data ====================

    /// Check if the store holds no records
    pub fn is_empty(&self) -> bool {
        let data = self.read();
        data.entries.is_empty() && data.collections.is_empty()
    }

    /// Assemble the full local state unit: device id plus aggregate
    pub fn guest_data(&self) -> GuestData {
        let data = self.read();
        GuestData {
            guest_id: self.device_id(),
            entries: data.entries,
            collections: data.collections,
        }
    }

    /// Replace the device identity and aggregate with the given values
    pub fn set_guest_data(&self, data: GuestData) -> Result<(), StoreError> {
        self.identity.set(data.guest_id)?;
        self.write(&StoreData {
            entries: data.entries,
            collections: data.collections,
        })
    }

    /// Clear all guest state: aggregate and device id
    ///
    /// Called exactly once per guest lifecycle, when a merge succeeds or
    /// the user explicitly resets.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.persistence.clear_aggregate()?;
        self.identity.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, Status};
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            api_url: "http://localhost:8080/api".to_string(),
        }
    }

    fn book_entry(title: &str) -> (Entry, MediaItem) {
        let media = MediaItem::new(MediaType::Book, title);
        let entry = Entry::new(media.id, Status::Planned);
        (entry, media)
    }

    #[test]
    fn test_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        assert!(store.is_empty());
        assert!(store.entries().is_empty());
        assert!(store.collections().is_empty());
    }

    #[test]
    fn test_add_entry_embeds_media() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();

        let stored = store.get_entry(entry.id).unwrap();
        assert_eq!(stored.media_id, media.id);
        assert_eq!(stored.media.as_ref().unwrap().id, media.id);
        assert_eq!(stored.media.as_ref().unwrap().title, "Dune");
    }

    #[test]
    fn test_add_entry_rejects_media_id_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let media = MediaItem::new(MediaType::Movie, "Stalker");
        let entry = Entry::new(Uuid::new_v4(), Status::Planned);

        let result = store.add_entry(&entry, &media);
        assert!(matches!(result, Err(StoreError::MediaIdMismatch { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_entry_rejects_duplicate_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();

        let result = store.add_entry(&entry, &media);
        assert!(matches!(result, Err(StoreError::DuplicateEntry(_))));
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_update_entry_shallow_merge() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (mut entry, media) = book_entry("Dune");
        entry.set_review(Some("promising".to_string()));
        store.add_entry(&entry, &media).unwrap();

        store
            .update_entry(
                entry.id,
                EntryPatch {
                    status: Some(Status::Completed),
                    rating: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = store.get_entry(entry.id).unwrap();
        assert_eq!(stored.status, Status::Completed);
        assert_eq!(stored.rating, Some(9));
        // Fields not in the patch are retained
        assert_eq!(stored.review_md.as_deref(), Some("promising"));
        assert!(stored.media.is_some());
    }

    #[test]
    fn test_update_absent_entry_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();
        let before = store.read();

        store
            .update_entry(
                Uuid::new_v4(),
                EntryPatch {
                    status: Some(Status::Dropped),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.read(), before);
    }

    #[test]
    fn test_remove_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();
        assert!(store.contains_entry(entry.id));

        store.remove_entry(entry.id).unwrap();
        assert!(!store.contains_entry(entry.id));

        // Removing again is a silent no-op
        store.remove_entry(entry.id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_media_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Solaris");
        store.add_entry(&entry, &media).unwrap();

        let found = store.get_media(media.id).unwrap();
        assert_eq!(found.title, "Solaris");
        assert!(store.get_media(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_media_touches_all_snapshots() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Solaris");
        store.add_entry(&entry, &media).unwrap();

        store
            .update_media(
                media.id,
                MediaPatch {
                    year: Some(1961),
                    ..Default::default()
                },
            )
            .unwrap();

        let found = store.get_media(media.id).unwrap();
        assert_eq!(found.year, Some(1961));
        assert_eq!(found.title, "Solaris");
    }

    #[test]
    fn test_collection_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let collection = Collection::new("Winter backlog");
        store.add_collection(&collection).unwrap();
        assert!(store.contains_collection(collection.id));

        store
            .update_collection(
                collection.id,
                CollectionPatch {
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.get_collection(collection.id).unwrap().is_public);

        store.remove_collection(collection.id).unwrap();
        assert!(!store.contains_collection(collection.id));
    }

    #[test]
    fn test_add_collection_rejects_duplicate_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let collection = Collection::new("Winter backlog");
        store.add_collection(&collection).unwrap();

        let result = store.add_collection(&collection);
        assert!(matches!(result, Err(StoreError::DuplicateCollection(_))));
        assert_eq!(store.collections().len(), 1);
    }

    #[test]
    fn test_clear_entries_keeps_collections() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();
        store.add_collection(&Collection::new("Keep me")).unwrap();

        store.clear_entries().unwrap();
        assert!(store.entries().is_empty());
        assert_eq!(store.collections().len(), 1);
    }

    #[test]
    fn test_clear_resets_aggregate_and_identity() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();
        let original_id = store.device_id();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(store.identity().peek().is_none());
        assert_ne!(store.device_id(), original_id);
    }

    #[test]
    fn test_guest_data_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let (entry, media) = book_entry("Dune");
        store.add_entry(&entry, &media).unwrap();
        let data = store.guest_data();

        let other_dir = TempDir::new().unwrap();
        let other = GuestStore::with_config(test_config(&other_dir));
        other.set_guest_data(data.clone()).unwrap();

        assert_eq!(other.guest_data(), data);
        assert_eq!(other.device_id(), data.guest_id);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let store = GuestStore::with_config(config.clone());
            let (entry, media) = book_entry("Roadside Picnic");
            store.add_entry(&entry, &media).unwrap();
        }

        let store = GuestStore::with_config(config);
        assert_eq!(store.entry_count(), 1);
        assert_eq!(
            store.entries()[0].media.as_ref().unwrap().title,
            "Roadside Picnic"
        );
    }

    /// Mutator sequences must match an in-memory reference model: no lost
    /// updates within one execution context.
    #[test]
    fn test_mutator_sequence_matches_reference_model() {
        let temp_dir = TempDir::new().unwrap();
        let store = GuestStore::with_config(test_config(&temp_dir));

        let mut reference: Vec<Entry> = Vec::new();

        let items: Vec<(Entry, MediaItem)> = (0..5)
            .map(|i| book_entry(&format!("Book {}", i)))
            .collect();

        // add all five
        for (entry, media) in &items {
            store.add_entry(entry, media).unwrap();
            let mut e = entry.clone();
            e.media = Some(media.clone());
            reference.push(e);
        }

        // update the second
        let patch = EntryPatch {
            status: Some(Status::InProgress),
            ..Default::default()
        };
        store.update_entry(items[1].0.id, patch.clone()).unwrap();
        reference
            .iter_mut()
            .find(|e| e.id == items[1].0.id)
            .unwrap()
            .apply(patch);

        // remove the fourth
        store.remove_entry(items[3].0.id).unwrap();
        reference.retain(|e| e.id != items[3].0.id);

        // update an absent id (no-op on both sides)
        store
            .update_entry(
                Uuid::new_v4(),
                EntryPatch {
                    rating: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = store.entries();
        assert_eq!(stored.len(), reference.len());
        for (got, want) in stored.iter().zip(reference.iter()) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.status, want.status);
            assert_eq!(got.media, want.media);
        }
    }
}
