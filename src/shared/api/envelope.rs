// src/shared/api/envelope.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ success, message?, data?: { user? } }` as sent by the profile API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl ApiEnvelope {
    /// A JSON object carrying a boolean `success` is treated as an envelope;
    /// anything else is a bare document.
    pub fn is_envelope(value: &Value) -> bool {
        value.get("success").is_some_and(Value::is_boolean)
    }

    pub fn into_user(self) -> Option<Value> {
        self.data.and_then(|d| d.user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Best-effort view of an error body: `{ message }` or `{ error: { code, message } }`.
/// A bare error code is used when no message was sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl ApiErrorBody {
    /// Parses `body`, returning its first non-blank message or code.
    pub fn message_from(body: &str) -> Option<String> {
        let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
        let detail = parsed.error.unwrap_or(ApiErrorDetail {
            code: None,
            message: None,
        });
        [parsed.message, detail.message, detail.code]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_envelopes() {
        assert!(ApiEnvelope::is_envelope(&json!({ "success": true, "data": {} })));
        assert!(!ApiEnvelope::is_envelope(&json!({ "fullName": "Ada" })));
        assert!(!ApiEnvelope::is_envelope(&json!({ "success": "yes" })));
        assert!(!ApiEnvelope::is_envelope(&json!([1, 2])));
    }

    #[test]
    fn extracts_user_from_envelope() {
        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "success": true,
            "data": { "user": { "fullname": "Ada" } }
        }))
        .unwrap();

        assert_eq!(envelope.into_user(), Some(json!({ "fullname": "Ada" })));
    }

    #[test]
    fn envelope_without_data_has_no_user() {
        let envelope: ApiEnvelope =
            serde_json::from_value(json!({ "success": false, "message": "nope" })).unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("nope"));
        assert_eq!(envelope.into_user(), None);
    }

    #[test]
    fn error_message_is_best_effort() {
        assert_eq!(
            ApiErrorBody::message_from(r#"{"message":"Invalid date"}"#),
            Some("Invalid date".to_string())
        );
        assert_eq!(
            ApiErrorBody::message_from(
                r#"{"success":false,"error":{"code":"BAD","message":"Bad input"}}"#
            ),
            Some("Bad input".to_string())
        );
        assert_eq!(
            ApiErrorBody::message_from(r#"{"message":" ","error":{"code":"PROFILE_LOCKED"}}"#),
            Some("PROFILE_LOCKED".to_string())
        );
        assert_eq!(ApiErrorBody::message_from(r#"{"message":"  "}"#), None);
        assert_eq!(ApiErrorBody::message_from("<html>oops</html>"), None);
    }
}
