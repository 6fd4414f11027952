// src/modules/profile/adapter/outgoing/profile_backend_http.rs

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use crate::profile::application::ports::outgoing::{
    BackendError, ProfileBackend, RawProfileDocument, SectionUpdate,
};
use crate::shared::api::{ApiEnvelope, ApiErrorBody};
use crate::shared::config::ProfileClientConfig;

const FETCH_PATH: &str = "user/me";
const UPDATE_PATH: &str = "user/profile/update";

/// REST implementation of [`ProfileBackend`].
#[derive(Debug, Clone)]
pub struct ProfileBackendHttp {
    client: reqwest::Client,
    config: ProfileClientConfig,
}

impl ProfileBackendHttp {
    pub fn new(config: ProfileClientConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorized(request).send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: ApiErrorBody::message_from(&body),
            });
        }
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::MalformedResponse(e.to_string())
    } else {
        BackendError::Network(e.to_string())
    }
}

/// Unwraps `{ success, data: { user } }`, rejecting `success: false`.
fn open_envelope(value: Value) -> Result<Option<Value>, BackendError> {
    let envelope: ApiEnvelope = serde_json::from_value(value)
        .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
    if !envelope.success {
        return Err(BackendError::Unsuccessful(envelope.message));
    }
    Ok(envelope.into_user())
}

#[async_trait]
impl ProfileBackend for ProfileBackendHttp {
    async fn fetch_profile(&self) -> Result<RawProfileDocument, BackendError> {
        let url = self.config.endpoint(FETCH_PATH);
        debug!(%url, "Fetching profile");

        let response = self.send(self.client.get(&url)).await.inspect_err(|e| {
            error!(%url, error = %e, "Profile fetch failed");
        })?;
        let body: Value = response.json().await.map_err(|e| {
            BackendError::MalformedResponse(format!("Profile body is not JSON: {e}"))
        })?;

        if ApiEnvelope::is_envelope(&body) {
            open_envelope(body)?.ok_or_else(|| {
                BackendError::MalformedResponse("Envelope carries no user".to_string())
            })
        } else {
            Ok(body)
        }
    }

    async fn update_section(
        &self,
        update: SectionUpdate,
    ) -> Result<Option<RawProfileDocument>, BackendError> {
        let url = self.config.endpoint(UPDATE_PATH);
        debug!(%url, section = ?update.section, "Sending profile section");

        let response = self
            .send(self.client.post(&url).json(&update.body))
            .await
            .inspect_err(|e| {
                error!(%url, section = ?update.section, error = %e, "Profile update failed");
            })?;
        let text = response.text().await.map_err(transport_error)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| BackendError::MalformedResponse(format!("Update body is not JSON: {e}")))?;
        if ApiEnvelope::is_envelope(&body) {
            open_envelope(body)
        } else {
            debug!("Update response has no envelope; no server copy to reconcile");
            Ok(None)
        }
    }
}
