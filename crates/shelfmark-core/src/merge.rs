//! Guest-to-account merge
//!
//! The terminal step of the guest lifecycle: fold everything the guest
//! created into a just-authenticated account, exactly once. The whole
//! entry list goes up as a single request; success or failure applies to
//! the batch, never per-entry.
//!
//! On success the guest aggregate and device identity are cleared, so a
//! repeated merge cannot resend already-merged records. On failure local
//! state is left untouched and the caller may retry; a retry resubmits the
//! same still-present data, which is what makes the client side of the
//! protocol idempotent.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::MergeRequest;
use crate::store::{GuestStore, StoreError};

/// Where the client stands in the guest-to-account transition
///
/// `Guest -(login succeeds)-> MergePending -(merge succeeds)-> Authenticated`;
/// a failed merge drops back to `Guest` with no data loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    Guest,
    MergePending,
    Authenticated,
}

/// Result of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of guest entries folded into the account
    pub merged_entries: usize,
}

/// Errors from the merge protocol
#[derive(Error, Debug)]
pub enum MergeError {
    /// The server rejected the merge or the request never completed.
    /// Local guest state is untouched; retry later.
    #[error("Merge failed: {0}")]
    Submit(#[from] ApiError),

    /// The server accepted the merge but local guest state could not be
    /// cleared. Nothing is lost, but the local aggregate is stale and a
    /// blind retry could duplicate entries server-side. The phase reports
    /// `Authenticated`, matching the server's view.
    #[error("Merge succeeded but guest state could not be cleared: {0}")]
    Cleanup(#[from] StoreError),
}

/// Submission seam for the merge request
///
/// `ApiClient` is the production implementation; tests substitute their
/// own to exercise the protocol without a server.
#[async_trait]
pub trait MergeTransport: Send + Sync {
    async fn submit_merge(&self, request: &MergeRequest, token: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl MergeTransport for ApiClient {
    async fn submit_merge(&self, request: &MergeRequest, token: &str) -> Result<(), ApiError> {
        self.merge_guest(request, token).await
    }
}

/// Coordinates the one-time guest-to-account merge
#[derive(Debug)]
pub struct MergeEngine {
    phase: MergePhase,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self {
            phase: MergePhase::Guest,
        }
    }

    /// Current phase of the transition
    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    /// Merge the store's guest entries into the account behind `token`
    ///
    /// Builds one request from the full current entry list (embedded media
    /// snapshots included, since the server has not seen these records
    /// under the authenticated identity) and submits it. An empty store
    /// transitions without a network call.
    pub async fn merge<T: MergeTransport>(
        &mut self,
        store: &GuestStore,
        transport: &T,
        token: &str,
    ) -> Result<MergeOutcome, MergeError> {
        self.phase = MergePhase::MergePending;

        let guest_entries = store.entries();
        let merged_entries = guest_entries.len();

        if merged_entries == 0 {
            debug!("no guest entries to merge");
        } else {
            let request = MergeRequest { guest_entries };
            if let Err(err) = transport.submit_merge(&request, token).await {
                warn!(%err, "merge submission failed, guest state retained");
                self.phase = MergePhase::Guest;
                return Err(err.into());
            }
        }

        // The server has accepted the batch at this point; the phase
        // reflects that even if local cleanup fails below.
        self.phase = MergePhase::Authenticated;

        // The aggregate is retired here and must never be merged twice.
        store.clear()?;
        info!(merged_entries, "guest data merged into account");

        Ok(MergeOutcome { merged_entries })
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}
