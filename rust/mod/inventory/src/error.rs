use pabrik_client::ApiError;
use pabrik_kv::KVError;
use thiserror::Error;

/// Stable error codes for the inventory layer.
pub mod error_code {
    pub const REMOTE: &str = "REMOTE";
    pub const LOCAL_STATE: &str = "LOCAL_STATE";
    pub const VALIDATION: &str = "VALIDATION";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

/// Error returned by mutating operations. The message is meant to be shown
/// to the user as-is: `failed to create warehouse: Value for field "kode_gudang" has to be unique.`
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A Directus call failed. `context` says what was being attempted.
    #[error("{context}: {}", .source.joined_messages())]
    Api {
        context: String,
        #[source]
        source: ApiError,
    },

    /// The local state store failed.
    #[error("local state: {0}")]
    Storage(#[from] KVError),

    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The record does not exist (or is not visible with this token).
    #[error("{0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Api {
                source: ApiError::Validation(_),
                ..
            } => error_code::VALIDATION,
            ServiceError::Api { .. } => error_code::REMOTE,
            ServiceError::Storage(_) => error_code::LOCAL_STATE,
            ServiceError::Validation(_) => error_code::VALIDATION,
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
        }
    }

    /// HTTP status of the underlying remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Wrap an [`ApiError`] with what was being attempted.
pub(crate) fn api(context: impl Into<String>) -> impl FnOnce(ApiError) -> ServiceError {
    let context = context.into();
    move |source| ServiceError::Api { context, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_joins_remote_errors() {
        let source = ApiError::from_response(
            400,
            br#"{"errors":[{"message":"kode_gudang must be unique"},{"message":"nama_gudang is required"}]}"#,
        );
        let err = api("failed to create warehouse")(source);
        assert_eq!(
            err.to_string(),
            "failed to create warehouse: kode_gudang must be unique, nama_gudang is required"
        );
        assert_eq!(err.error_code(), "REMOTE");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn validation_gap_keeps_its_code() {
        let err = api("failed to delete SPK")(ApiError::Validation("blank id".into()));
        assert_eq!(err.error_code(), "VALIDATION");
        assert_eq!(err.to_string(), "failed to delete SPK: invalid request: blank id");

        let err = api("failed to update SPK")(ApiError::Auth("no token".into()));
        assert_eq!(err.error_code(), error_code::REMOTE);
    }
}
