//! Device identity management
//!
//! A stable anonymous identifier tags guest-created records until they are
//! merged into an account. The id is generated on first use (random v4
//! UUID) and persisted; it survives restarts and is only replaced when a
//! snapshot is imported or cleared when a merge succeeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::storage::{GuestPersistence, StorageResult};

/// Anonymous device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Generate a new random device id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

impl From<Uuid> for DeviceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Device identity resolver
///
/// Owns the persisted device-id key; no other component writes it.
pub struct DeviceIdentity {
    persistence: GuestPersistence,
}

impl DeviceIdentity {
    /// Create a new identity resolver with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            persistence: GuestPersistence::new(config),
        }
    }

    /// Get the device id, generating and persisting one on first call
    ///
    /// Subsequent calls return the same value until it is overwritten or
    /// cleared. An unwritable substrate degrades to regeneration per call
    /// rather than failing.
    pub fn get_or_create(&self) -> DeviceId {
        if let Some(id) = self.persistence.load_device_id() {
            return DeviceId(id);
        }

        let id = DeviceId::new();
        debug!(%id, "generated new device id");
        if let Err(err) = self.persistence.save_device_id(id.as_uuid()) {
            tracing::warn!(%err, "could not persist device id, will regenerate next time");
        }
        id
    }

    /// Get the device id without generating one
    pub fn peek(&self) -> Option<DeviceId> {
        self.persistence.load_device_id().map(DeviceId)
    }

    /// Overwrite the persisted device id
    ///
    /// Used when restoring an imported snapshot so the device identity
    /// matches the snapshot's.
    pub fn set(&self, id: DeviceId) -> StorageResult<()> {
        self.persistence.save_device_id(id.as_uuid())
    }

    /// Clear the persisted device id
    ///
    /// A subsequent `get_or_create` generates a fresh identity.
    pub fn clear(&self) -> StorageResult<()> {
        self.persistence.clear_device_id()
    }
}
