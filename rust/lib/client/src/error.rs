use serde::Deserialize;
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers recorded in the failure log.
// Callers match on these, never on the message.

pub mod error_code {
    pub const REMOTE: &str = "REMOTE";
    pub const TRANSPORT: &str = "TRANSPORT";
    pub const DECODE: &str = "DECODE";
    pub const AUTH: &str = "AUTH";
    pub const VALIDATION: &str = "VALIDATION";
}

/// Client-side API error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `errors` holds every
    /// `errors[].message` from the body, in order.
    #[error("HTTP {status}: {}", .errors.first().map(String::as_str).unwrap_or("no error message"))]
    Remote { status: u16, errors: Vec<String> },

    /// The request never reached the server or no response came back.
    #[error("network: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON envelope.
    #[error("decode: {0}")]
    Decode(String),

    /// The token source could not produce a credential.
    #[error("auth: {0}")]
    Auth(String),

    /// Arguments were unusable (blank id, bad collection name) and no request
    /// was made.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl ApiError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Remote { .. } => error_code::REMOTE,
            ApiError::Transport(_) => error_code::TRANSPORT,
            ApiError::Decode(_) => error_code::DECODE,
            ApiError::Auth(_) => error_code::AUTH,
            ApiError::Validation(_) => error_code::VALIDATION,
        }
    }

    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// First structured error message reported by the server.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Remote { errors, .. } => errors.first().map(String::as_str),
            _ => None,
        }
    }

    /// All server messages joined with `", "`, or the error text when the
    /// server sent none.
    pub fn joined_messages(&self) -> String {
        match self {
            ApiError::Remote { errors, .. } if !errors.is_empty() => errors.join(", "),
            other => other.to_string(),
        }
    }

    /// Build a remote error from a status and a raw response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            errors: Vec<ErrorItem>,
        }
        #[derive(Deserialize)]
        struct ErrorItem {
            message: Option<String>,
        }

        let errors = serde_json::from_slice::<ErrorBody>(body)
            .map(|b| b.errors.into_iter().filter_map(|e| e.message).collect())
            .unwrap_or_default();
        ApiError::Remote { status, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_takes_first_message() {
        let body = br#"{"errors":[{"message":"Value for field \"kode\" has to be unique."},{"message":"second"}]}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.message(),
            Some("Value for field \"kode\" has to be unique.")
        );
        assert_eq!(
            err.to_string(),
            "HTTP 400: Value for field \"kode\" has to be unique."
        );
        assert!(err.joined_messages().ends_with(", second"));
    }

    #[test]
    fn remote_error_without_structured_body() {
        let err = ApiError::from_response(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "HTTP 502: no error message");
        assert_eq!(err.joined_messages(), "HTTP 502: no error message");
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ApiError::from_response(404, b"").error_code(), "REMOTE");
        assert_eq!(ApiError::Decode("x".into()).error_code(), "DECODE");
        assert_eq!(ApiError::Auth("x".into()).error_code(), "AUTH");
        assert_eq!(ApiError::Validation("x".into()).error_code(), "VALIDATION");
        assert_eq!(ApiError::Validation("x".into()).status(), None);
    }
}
