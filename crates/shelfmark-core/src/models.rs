//! Data models for Shelfmark
//!
//! Defines the core data structures: media items, entries, collections,
//! share tokens, and the request/response DTOs used at the API boundary.
//! All types serialize as the JSON shapes the server expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Open, schema-less metadata (creators, progress payloads, etc.)
///
/// Modeled as a JSON object so fields the core never interprets survive
/// round-trips unchanged.
pub type Metadata = Map<String, Value>;

/// Kind of media an entry tracks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Book,
    Anime,
    Game,
    Tv,
    Movie,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaType::Video => "video",
            MediaType::Book => "book",
            MediaType::Anime => "anime",
            MediaType::Game => "game",
            MediaType::Tv => "tv",
            MediaType::Movie => "movie",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaType::Video),
            "book" => Ok(MediaType::Book),
            "anime" => Ok(MediaType::Anime),
            "game" => Ok(MediaType::Game),
            "tv" => Ok(MediaType::Tv),
            "movie" => Ok(MediaType::Movie),
            other => Err(format!("unknown media type: {}", other)),
        }
    }
}

/// Tracking status of an entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Planned,
    InProgress,
    Completed,
    OnHold,
    Dropped,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Planned => "planned",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::OnHold => "on_hold",
            Status::Dropped => "dropped",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Status::Planned),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            "on_hold" => Ok(Status::OnHold),
            "dropped" => Ok(Status::Dropped),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// An authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog record for a piece of media
///
/// Immutable once created server-side. While guest-local it is embedded by
/// value inside the entry that references it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    /// Unique identifier
    pub id: Uuid,
    /// Media kind
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Display title
    pub title: String,
    /// Title in the original language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Release year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Cover image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Creators (author, director, studio, ...) keyed by role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creators: Option<Metadata>,
    /// Genres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Duration in minutes (or pages, chapters - type dependent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Free-form extra fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// When this item was created
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Create a new media item with the given type and title
    pub fn new(media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_type,
            title: title.into(),
            original_title: None,
            year: None,
            cover_url: None,
            creators: None,
            genres: None,
            duration: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }
}

/// A user's tracked relationship to a media item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier, assigned at creation and never reused
    pub id: Uuid,
    /// Owning account, absent while guest-local
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// The media item this entry tracks
    pub media_id: Uuid,
    /// Tracking status
    pub status: Status,
    /// Rating (scale is a caller concern)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    /// Free-text review (markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_md: Option<String>,
    /// Structured progress payload (episode counts, page numbers, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Metadata>,
    /// When the user started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the user finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// When this entry was last updated
    pub updated_at: DateTime<Utc>,
    /// Embedded media snapshot (denormalized while guest-local)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaItem>,
}

impl Entry {
    /// Create a new entry for the given media item id
    pub fn new(media_id: Uuid, status: Status) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            media_id,
            status,
            rating: None,
            review_md: None,
            progress: None,
            started_at: None,
            finished_at: None,
            updated_at: Utc::now(),
            media: None,
        }
    }

    /// Update the status
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Update the rating
    pub fn set_rating(&mut self, rating: Option<i32>) {
        self.rating = rating;
        self.updated_at = Utc::now();
    }

    /// Update the review text
    pub fn set_review(&mut self, review: Option<String>) {
        self.review_md = review;
        self.updated_at = Utc::now();
    }

    /// Apply a partial update, retaining fields the patch leaves unset
    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(review_md) = patch.review_md {
            self.review_md = Some(review_md);
        }
        if let Some(progress) = patch.progress {
            self.progress = Some(progress);
        }
        if let Some(started_at) = patch.started_at {
            self.started_at = Some(started_at);
        }
        if let Some(finished_at) = patch.finished_at {
            self.finished_at = Some(finished_at);
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update for an entry
///
/// Fields left as `None` are retained on the target record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Partial update for a media item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl MediaItem {
    /// Apply a partial update
    pub fn apply(&mut self, patch: MediaPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(original_title) = patch.original_title {
            self.original_title = Some(original_title);
        }
        if let Some(year) = patch.year {
            self.year = Some(year);
        }
        if let Some(cover_url) = patch.cover_url {
            self.cover_url = Some(cover_url);
        }
        if let Some(genres) = patch.genres {
            self.genres = Some(genres);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = Some(metadata);
        }
    }
}

/// A named grouping of entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    /// Unique identifier
    pub id: Uuid,
    /// Owning account, absent while guest-local
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Display title
    pub title: String,
    /// Whether the collection is publicly visible
    pub is_public: bool,
    /// When this collection was created
    pub created_at: DateTime<Utc>,
    /// Resolved member entries (denormalized view, never the source of
    /// truth for membership)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
}

impl Collection {
    /// Create a new private collection with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            title: title.into(),
            is_public: false,
            created_at: Utc::now(),
            entries: None,
        }
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: CollectionPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        if let Some(entries) = patch.entries {
            self.entries = Some(entries);
        }
    }
}

/// Partial update for a collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
}

/// An opaque share token minted by the server
///
/// Never created or mutated locally; expiry is checked server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShareToken {
    pub token: String,
    pub kind: String,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ==================== Request/Response DTOs ====================

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request body for creating an entry server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub media_id: Uuid,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Request body for creating a media item server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaRequest {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creators: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Request body for creating a collection server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub title: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_ids: Option<Vec<Uuid>>,
}

/// Request body for minting a public guest snapshot share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSnapshotRequest {
    pub entries: Vec<Entry>,
    pub media: Vec<MediaItem>,
}

/// Request body for merging guest entries into an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub guest_entries: Vec<Entry>,
}

/// Response carrying a share URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareUrl {
    pub share_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new() {
        let media_id = Uuid::new_v4();
        let entry = Entry::new(media_id, Status::Planned);
        assert_eq!(entry.media_id, media_id);
        assert_eq!(entry.status, Status::Planned);
        assert!(entry.user_id.is_none());
        assert!(entry.media.is_none());
        assert!(entry.rating.is_none());
    }

    #[test]
    fn test_entry_apply_patch() {
        let mut entry = Entry::new(Uuid::new_v4(), Status::Planned);
        let original_updated = entry.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(10));

        entry.apply(EntryPatch {
            status: Some(Status::InProgress),
            rating: Some(8),
            ..Default::default()
        });

        assert_eq!(entry.status, Status::InProgress);
        assert_eq!(entry.rating, Some(8));
        assert!(entry.review_md.is_none());
        assert!(entry.updated_at > original_updated);
    }

    #[test]
    fn test_entry_patch_retains_unset_fields() {
        let mut entry = Entry::new(Uuid::new_v4(), Status::Planned);
        entry.set_rating(Some(7));
        entry.set_review(Some("solid".to_string()));

        entry.apply(EntryPatch {
            status: Some(Status::Completed),
            ..Default::default()
        });

        assert_eq!(entry.rating, Some(7));
        assert_eq!(entry.review_md.as_deref(), Some("solid"));
        assert_eq!(entry.status, Status::Completed);
    }

    #[test]
    fn test_media_type_roundtrip() {
        for t in ["video", "book", "anime", "game", "tv", "movie"] {
            let parsed: MediaType = t.parse().unwrap();
            assert_eq!(parsed.to_string(), t);
        }
        assert!("podcast".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["planned", "in_progress", "completed", "on_hold", "dropped"] {
            let parsed: Status = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("watching".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_media_type_serde_uses_type_field() {
        let media = MediaItem::new(MediaType::Book, "Dune");
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["type"], "book");
        assert_eq!(json["title"], "Dune");
    }

    #[test]
    fn test_entry_serialization_roundtrip() {
        let media = MediaItem::new(MediaType::Anime, "Mushishi");
        let mut entry = Entry::new(media.id, Status::InProgress);
        entry.media = Some(media);
        entry.set_rating(Some(9));

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, deserialized);
    }

    #[test]
    fn test_collection_new() {
        let collection = Collection::new("Favorites");
        assert_eq!(collection.title, "Favorites");
        assert!(!collection.is_public);
        assert!(collection.entries.is_none());
    }

    #[test]
    fn test_collection_apply_patch() {
        let mut collection = Collection::new("Backlog");
        collection.apply(CollectionPatch {
            title: Some("2026 Backlog".to_string()),
            is_public: Some(true),
            ..Default::default()
        });
        assert_eq!(collection.title, "2026 Backlog");
        assert!(collection.is_public);
    }

    #[test]
    fn test_progress_metadata_preserved() {
        let mut entry = Entry::new(Uuid::new_v4(), Status::InProgress);
        let mut progress = Metadata::new();
        progress.insert("episode".to_string(), serde_json::json!(12));
        progress.insert("season".to_string(), serde_json::json!("2"));
        entry.apply(EntryPatch {
            progress: Some(progress.clone()),
            ..Default::default()
        });

        let json = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.progress, Some(progress));
    }
}
