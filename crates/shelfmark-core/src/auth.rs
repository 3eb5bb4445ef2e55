//! Authentication state
//!
//! Tracks whether the client is a guest or an authenticated account and
//! persists the session (user + bearer token) across restarts. Exactly one
//! of guest/authenticated holds at any time; the enum makes that true by
//! construction.
//!
//! Logout clears the credential but never resurrects previously cleared
//! guest data; the guest store is untouched by auth transitions except
//! through the merge engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::User;
use crate::storage::{GuestPersistence, StorageResult};

/// A persisted authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Client identity state
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Unauthenticated, tracked only by the device identifier
    Guest,
    /// Logged in with a bearer credential
    Authenticated { user: User, token: String },
}

impl AuthState {
    pub fn is_guest(&self) -> bool {
        matches!(self, AuthState::Guest)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    /// The bearer token, when authenticated
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthState::Guest => None,
            AuthState::Authenticated { token, .. } => Some(token),
        }
    }

    /// The logged-in user, when authenticated
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Guest => None,
            AuthState::Authenticated { user, .. } => Some(user),
        }
    }
}

/// Persistent session storage
pub struct SessionStore {
    persistence: GuestPersistence,
}

impl SessionStore {
    /// Create a session store with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            persistence: GuestPersistence::new(config),
        }
    }

    /// Load the current auth state
    ///
    /// A missing or malformed session file means guest; malformed files
    /// are removed (treated as logged out, never an error).
    pub fn load(&self) -> AuthState {
        match self.persistence.load_session() {
            Some(session) => AuthState::Authenticated {
                user: session.user,
                token: session.token,
            },
            None => AuthState::Guest,
        }
    }

    /// Persist a just-completed login
    pub fn login(&self, user: User, token: String) -> StorageResult<AuthState> {
        debug!(user_id = %user.id, "persisting session");
        let session = Session {
            user: user.clone(),
            token: token.clone(),
        };
        self.persistence.save_session(&session)?;
        Ok(AuthState::Authenticated { user, token })
    }

    /// Clear the credential and return to guest
    pub fn logout(&self) -> StorageResult<AuthState> {
        self.persistence.clear_session()?;
        Ok(AuthState::Guest)
    }
}
