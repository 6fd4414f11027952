pub mod profile_backend;
pub use profile_backend::{
    BackendError, ProfileBackend, ProfileSection, RawProfileDocument, SectionUpdate,
};
