mod apply_profile_edit;
mod load_profile;

pub use apply_profile_edit::{ApplyProfileEditUseCase, SyncError, SAVE_FAILED_MESSAGE};
pub use load_profile::LoadProfileUseCase;
