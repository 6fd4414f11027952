pub mod profile_backend_http;

pub use profile_backend_http::ProfileBackendHttp;
