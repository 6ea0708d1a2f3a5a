use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Coarse classification of a failed service call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    InvalidResponse,
    CredentialInvalid,
    QuotaExhausted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API key invalid or reset: {0}")]
    CredentialInvalid(String),

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Transport(_) => ErrorKind::Transport,
            ServiceError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ServiceError::CredentialInvalid(_) => ErrorKind::CredentialInvalid,
            ServiceError::QuotaExhausted(_) => ErrorKind::QuotaExhausted,
        }
    }

    /// True for the two errors the user can fix by picking another key
    pub fn is_credential_related(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CredentialInvalid | ErrorKind::QuotaExhausted
        )
    }

    /// Classify a non-success HTTP response from the provider.
    ///
    /// Uses the HTTP status and the structured `error.status` /
    /// `error.details[].reason` fields of the provider's error envelope.
    pub fn from_http(status: StatusCode, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let detail = envelope.as_ref().map(|e| &e.error);
        let message = detail
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        let provider_status = detail.and_then(|d| d.status.as_deref()).unwrap_or_default();
        let key_invalid = detail
            .map(|d| {
                d.details
                    .iter()
                    .any(|x| x.reason.as_deref() == Some("API_KEY_INVALID"))
            })
            .unwrap_or(false);

        if status == StatusCode::TOO_MANY_REQUESTS || provider_status == "RESOURCE_EXHAUSTED" {
            return ServiceError::QuotaExhausted(message);
        }

        if key_invalid
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || provider_status == "UNAUTHENTICATED"
            || provider_status == "PERMISSION_DENIED"
            // A key whose project was reset answers with NOT_FOUND
            || (status == StatusCode::NOT_FOUND && provider_status == "NOT_FOUND")
        {
            return ServiceError::CredentialInvalid(message);
        }

        ServiceError::Transport(format!("{} ({})", message, status.as_u16()))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ServiceError::InvalidResponse(error.to_string())
        } else {
            ServiceError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(error: serde_json::Error) -> Self {
        ServiceError::InvalidResponse(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_from_status_code() {
        let err = ServiceError::from_http(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.kind(), ErrorKind::QuotaExhausted);
    }

    #[test]
    fn test_quota_from_provider_status() {
        let body = r#"{"error":{"code":400,"message":"Quota exceeded for metric","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = ServiceError::from_http(StatusCode::BAD_REQUEST, body);
        assert_eq!(err, ServiceError::QuotaExhausted("Quota exceeded for metric".to_string()));
    }

    #[test]
    fn test_invalid_key_reason() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let err = ServiceError::from_http(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(err.is_credential_related());
    }

    #[test]
    fn test_reset_project_is_credential_error() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let err = ServiceError::from_http(StatusCode::NOT_FOUND, body);
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_other_failures_are_transport() {
        let body = r#"{"error":{"code":500,"message":"Internal error","status":"INTERNAL"}}"#;
        let err = ServiceError::from_http(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.is_credential_related());

        // Unparseable body still classifies by status
        let err = ServiceError::from_http(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_bad_request_without_key_reason_is_transport() {
        let body = r#"{"error":{"code":400,"message":"Invalid JSON payload","status":"INVALID_ARGUMENT"}}"#;
        let err = ServiceError::from_http(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
