use async_trait::async_trait;

use crate::profile::application::ports::outgoing::{BackendError, ProfileSection};
use crate::profile::domain::draft::{Draft, EditMode, EntityKind};
use crate::profile::domain::entities::Profile;

//
// ──────────────────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────────────────
//

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save changes";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Another apply is still waiting on the backend.
    #[error("Another save is still in progress")]
    Busy,

    #[error("No {kind} at position {index}")]
    IndexOutOfRange { kind: EntityKind, index: usize },

    #[error("The {0} section cannot be deleted")]
    NotRemovable(EntityKind),

    #[error("Could not encode the {0:?} section: {1}")]
    Encoding(ProfileSection, String),

    /// The backend call failed; the optimistic change has been rolled back.
    #[error("{}", persistence_message(.cause))]
    Persistence { cause: BackendError },

    #[error("Could not load profile: {0}")]
    Fetch(BackendError),
}

fn persistence_message(cause: &BackendError) -> String {
    match cause.backend_message() {
        Some(msg) if !msg.trim().is_empty() => format!("{SAVE_FAILED_MESSAGE}: {msg}"),
        _ => SAVE_FAILED_MESSAGE.to_string(),
    }
}

impl SyncError {
    /// True when the backend answered 401 and the session layer should
    /// invalidate its credentials.
    pub fn session_expired(&self) -> bool {
        matches!(
            self,
            SyncError::Persistence {
                cause: BackendError::Unauthorized
            } | SyncError::Fetch(BackendError::Unauthorized)
        )
    }
}

//
// ──────────────────────────────────────────────────────────
// Use case trait
// ──────────────────────────────────────────────────────────
//

#[async_trait]
pub trait ApplyProfileEditUseCase: Send + Sync {
    /// Adds (`New`) or replaces (`Edit(index)`) one record and persists the
    /// whole affected section. On failure the profile is exactly as before.
    async fn apply(&self, mode: EditMode, draft: Draft) -> Result<Profile, SyncError>;

    /// Removes one record from a repeatable section.
    async fn delete(&self, kind: EntityKind, index: usize) -> Result<Profile, SyncError>;
}
