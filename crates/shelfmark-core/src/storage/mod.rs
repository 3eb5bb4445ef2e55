//! Storage layer
//!
//! Whole-value JSON persistence for the guest aggregate, device id, and
//! auth session. The substrate is a plain key-to-file mapping: there is no
//! partial-update primitive, so consistency of partial fields lives in the
//! store's read-modify-write discipline, not here.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::GuestPersistence;
