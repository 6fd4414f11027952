use std::env;
use std::time::Duration;

pub const BASE_URL_VAR: &str = "PROFILE_API_BASE_URL";
pub const TOKEN_VAR: &str = "PROFILE_API_TOKEN";
pub const TIMEOUT_VAR: &str = "PROFILE_API_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where the profile backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileClientConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl ProfileClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads `.env.{RUST_ENV}` (falling back to `.env`) and reads the
    /// `PROFILE_API_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rust_env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let env_file = format!(".env.{}", rust_env);
        if dotenvy::from_filename(&env_file).is_err() {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: BASE_URL_VAR,
                value: base_url,
            });
        }

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
        };

        let mut config =
            Self::new(base_url.trim()).with_timeout(Duration::from_secs(timeout_secs));
        config.auth_token = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty());
        Ok(config)
    }

    /// Joins `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
