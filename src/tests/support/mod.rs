pub mod profile_fixtures;
pub mod recording_backend;
