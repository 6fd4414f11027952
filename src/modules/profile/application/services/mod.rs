pub mod dedup_merger;
pub mod edit_dialog;
pub mod entity_validator;
pub mod field_normalizer;
pub mod profile_sync_service;

pub use edit_dialog::{DialogError, DialogState, EditDialog, SubmitOutcome};
pub use profile_sync_service::ProfileSyncService;
