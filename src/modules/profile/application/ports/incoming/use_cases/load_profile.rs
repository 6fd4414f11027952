use async_trait::async_trait;
use tokio::sync::watch;

use super::apply_profile_edit::SyncError;
use crate::profile::domain::entities::Profile;

/// Read side of the canonical profile. Views only ever see clones or a
/// watch receiver; nothing here hands out a writable reference.
#[async_trait]
pub trait LoadProfileUseCase: Send + Sync {
    fn current(&self) -> Profile;

    fn subscribe(&self) -> watch::Receiver<Profile>;

    /// Re-fetches from the backend and replaces the profile wholesale.
    async fn refresh(&self) -> Result<Profile, SyncError>;
}
