// src/modules/profile/application/ports/outgoing/profile_backend.rs

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::profile::domain::draft::EntityKind;

/// Whatever the backend returns for a user, before normalization.
pub type RawProfileDocument = Value;

//
// ──────────────────────────────────────────────────────────
// Sections (whole-collection replacement)
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSection {
    Header,
    About,
    Skills,
    Education,
    Experience,
    Certifications,
}

impl ProfileSection {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::ProfileHeader => ProfileSection::Header,
            EntityKind::About => ProfileSection::About,
            EntityKind::Skill => ProfileSection::Skills,
            EntityKind::Education => ProfileSection::Education,
            EntityKind::Experience => ProfileSection::Experience,
            EntityKind::Certification => ProfileSection::Certifications,
        }
    }
}

/// One request body: the entire new value of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionUpdate {
    pub section: ProfileSection,
    pub body: Map<String, Value>,
}

//
// ──────────────────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// 401: the session layer must drop its credentials.
    #[error("Session expired")]
    Unauthorized,

    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// 2xx answer whose envelope says `success: false`.
    #[error("Update not accepted: {}", .0.as_deref().unwrap_or("no message"))]
    Unsuccessful(Option<String>),

    /// Connection failures and timeouts.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    /// Message the backend itself supplied, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected { message, .. } => message.as_deref(),
            BackendError::Unsuccessful(message) => message.as_deref(),
            _ => None,
        }
    }
}

//
// ──────────────────────────────────────────────────────────
// Port
// ──────────────────────────────────────────────────────────
//

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// `GET /user/me`
    async fn fetch_profile(&self) -> Result<RawProfileDocument, BackendError>;

    /// `POST /user/profile/update` with one whole section. Returns the
    /// server's copy of the user when the response carries one.
    async fn update_section(
        &self,
        update: SectionUpdate,
    ) -> Result<Option<RawProfileDocument>, BackendError>;
}
