//! Shelfmark Core Library
//!
//! This crate provides the core functionality for Shelfmark, a local-first
//! media tracker: accumulate entries and collections on-device as a guest,
//! then export them, mint a public read-only share, or fold them into an
//! account when the user logs in.
//!
//! # Architecture
//!
//! - **Guest store**: the local aggregate is the source of truth until a
//!   merge succeeds; every mutation is a whole-aggregate read-modify-write
//!
//! # Quick Start
//!
//! ```text
//! let store = GuestStore::open()?;
//!
//! // Track a book
//! let media = MediaItem::new(MediaType::Book, "Dune");
//! let entry = Entry::new(media.id, Status::Planned);
//! store.add_entry(&entry, &media)?;
//!
//! // Later, after login:
//! let mut engine = MergeEngine::new();
//! engine.merge(&store, &api, &token).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: guest record store and its mutators (main entry point)
//! - `models`: media items, entries, collections, and wire DTOs
//! - `identity`: anonymous device identifier
//! - `snapshot`: export/import and public-share projection
//! - `merge`: one-time guest-to-account merge
//! - `auth`: session state (guest vs authenticated)
//! - `api`: REST client
//! - `storage`: JSON file persistence
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod identity;
pub mod merge;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, Session, SessionStore};
pub use config::Config;
pub use identity::{DeviceId, DeviceIdentity};
pub use merge::{MergeEngine, MergeError, MergeOutcome, MergePhase, MergeTransport};
pub use models::{
    Collection, CollectionPatch, Entry, EntryPatch, MediaItem, MediaPatch, MediaType, ShareToken,
    Status, User,
};
pub use snapshot::{export_data, import_data, snapshot_request, SnapshotError};
pub use storage::{GuestPersistence, StorageError};
pub use store::{GuestData, GuestStore, StoreData, StoreError};
