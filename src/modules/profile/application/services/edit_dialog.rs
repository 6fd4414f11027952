use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::profile::application::ports::incoming::use_cases::{
    ApplyProfileEditUseCase, SyncError, SAVE_FAILED_MESSAGE,
};
use crate::profile::application::services::entity_validator::{validate, FieldError};
use crate::profile::domain::draft::{Draft, EditMode, EntityKind};
use crate::profile::domain::entities::Profile;

/// The single error the dialog shows at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// Shown next to `field`.
    Validation(FieldError),
    /// Shown as a banner at the top of the dialog.
    Persistence(String),
}

impl DialogError {
    pub fn message(&self) -> &str {
        match self {
            DialogError::Validation(err) => &err.message,
            DialogError::Persistence(msg) => msg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDialog {
    pub mode: EditMode,
    pub draft: Draft,
    pub error: Option<DialogError>,
}

impl OpenDialog {
    pub fn kind(&self) -> EntityKind {
        self.draft.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open(OpenDialog),
    /// The draft is kept so a failed save can reopen it unchanged.
    Saving(OpenDialog),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftPatchError {
    #[error("No record is being edited")]
    NotEditing,

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// What `begin_submit` hands to the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub mode: EditMode,
    pub draft: Draft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(Profile),
    Invalid(FieldError),
    Failed(String),
    /// Nothing was open, or a save is already running.
    Ignored,
}

/// Controller for the one generic add/edit dialog.
#[derive(Debug, Default)]
pub struct EditDialog {
    state: DialogState,
}

impl EditDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, DialogState::Saving(_))
    }

    pub fn current(&self) -> Option<&OpenDialog> {
        match &self.state {
            DialogState::Open(open) | DialogState::Saving(open) => Some(open),
            DialogState::Closed => None,
        }
    }

    pub fn error(&self) -> Option<&DialogError> {
        self.current().and_then(|open| open.error.as_ref())
    }

    fn open(&mut self, mode: EditMode, draft: Draft) -> bool {
        if self.is_saving() {
            debug!("Dialog is saving; open request ignored");
            return false;
        }
        debug!(kind = %draft.kind(), ?mode, "Opening edit dialog");
        self.state = DialogState::Open(OpenDialog {
            mode,
            draft,
            error: None,
        });
        true
    }

    /// Opens an empty record of `kind`, replacing any open dialog. No-op
    /// while saving.
    pub fn open_new(&mut self, kind: EntityKind) -> bool {
        self.open(EditMode::New, Draft::defaults(kind))
    }

    /// Opens an existing record for editing. No-op while saving.
    pub fn open_edit(&mut self, index: usize, existing: Draft) -> bool {
        self.open(EditMode::Edit(index), existing)
    }

    /// Opens the record currently stored at `index` in `profile`. Returns
    /// false when there is no such record.
    pub fn open_edit_from(&mut self, profile: &Profile, kind: EntityKind, index: usize) -> bool {
        match Draft::from_profile(profile, kind, index) {
            Some(existing) => self.open_edit(index, existing),
            None => false,
        }
    }

    /// Shallow-merges form values into the draft and clears the error.
    pub fn update_draft(&mut self, patch: &Map<String, Value>) -> Result<(), DraftPatchError> {
        let DialogState::Open(open) = &mut self.state else {
            return Err(DraftPatchError::NotEditing);
        };
        open.draft
            .apply_patch(patch)
            .map_err(|e| DraftPatchError::InvalidValue(e.to_string()))?;
        open.error = None;
        Ok(())
    }

    /// Validates the draft. Invalid drafts stay open with the first error;
    /// valid ones move to `Saving` and are returned for persistence.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        let DialogState::Open(open) = &mut self.state else {
            return None;
        };

        let report = validate(&open.draft);
        if let Some(first) = report.first_error() {
            warn!(kind = %open.kind(), field = first.field, "Draft rejected by validation");
            open.error = Some(DialogError::Validation(first.clone()));
            return None;
        }

        let ticket = SubmitTicket {
            mode: open.mode,
            draft: open.draft.clone(),
        };
        let open = std::mem::replace(&mut self.state, DialogState::Closed);
        if let DialogState::Open(mut open) = open {
            open.error = None;
            self.state = DialogState::Saving(open);
        }
        Some(ticket)
    }

    /// Resolves a running save: success closes the dialog, failure reopens
    /// it with the persistence message.
    pub fn finish_submit(&mut self, result: &Result<Profile, SyncError>) {
        let DialogState::Saving(_) = &self.state else {
            return;
        };
        let saving = std::mem::replace(&mut self.state, DialogState::Closed);
        if let (DialogState::Saving(mut open), Err(err)) = (saving, result) {
            open.error = Some(DialogError::Persistence(err.to_string()));
            self.state = DialogState::Open(open);
        }
    }

    /// Reopens a save that will never resolve (its future was dropped) with
    /// the generic failure banner. The sync layer has already rolled back.
    pub fn abandon_submit(&mut self) {
        let DialogState::Saving(_) = &self.state else {
            return;
        };
        let saving = std::mem::replace(&mut self.state, DialogState::Closed);
        if let DialogState::Saving(mut open) = saving {
            warn!(kind = %open.kind(), "Save abandoned before it resolved");
            open.error = Some(DialogError::Persistence(SAVE_FAILED_MESSAGE.to_string()));
            self.state = DialogState::Open(open);
        }
    }

    /// Full submit: validate, persist through `sync`, resolve. Dropping the
    /// returned future mid-save leaves the dialog open with an error rather
    /// than stuck in `Saving`.
    pub async fn submit<S>(&mut self, sync: &S) -> SubmitOutcome
    where
        S: ApplyProfileEditUseCase + ?Sized,
    {
        let Some(ticket) = self.begin_submit() else {
            return match self.error() {
                Some(DialogError::Validation(err)) if !self.is_saving() => {
                    SubmitOutcome::Invalid(err.clone())
                }
                _ => SubmitOutcome::Ignored,
            };
        };

        let pending = PendingSubmit { dialog: self };
        let result = sync.apply(ticket.mode, ticket.draft).await;
        pending.resolve(&result);
        match result {
            Ok(profile) => SubmitOutcome::Saved(profile),
            Err(err) => SubmitOutcome::Failed(err.to_string()),
        }
    }

    /// Discards the draft. A running save cannot be cancelled and is left alone.
    pub fn cancel(&mut self) {
        if self.is_saving() {
            debug!("Dialog is saving; cancel ignored");
            return;
        }
        self.state = DialogState::Closed;
    }
}

/// Abandons the save on drop unless it was resolved.
struct PendingSubmit<'a> {
    dialog: &'a mut EditDialog,
}

impl PendingSubmit<'_> {
    fn resolve(self, result: &Result<Profile, SyncError>) {
        self.dialog.finish_submit(result);
    }
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        self.dialog.abandon_submit();
    }
}
