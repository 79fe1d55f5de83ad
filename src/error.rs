//! Error types for the webhook

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main error type for webhook operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The admission review envelope was invalid or malformed
    #[error("malformed admission review: {0}")]
    MalformedReview(String),

    /// An error occurred while communicating with the Kubernetes API
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// ServiceAccount resolution failed for a reason other than "not found"
    #[error("resolver error: {0}")]
    Resolver(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The admission patch could not be serialized into the response
    #[error("patch serialization error: {0}")]
    SerializePatch(#[from] kube::core::admission::SerializePatchError),

    /// Invalid or missing startup configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Server-side failure outside the request path
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a malformed-review error with the given message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedReview(msg.into())
    }

    /// Create a resolver error with the given message
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::MalformedReview(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Kube(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::Resolver(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Serialization(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::SerializePatch(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = Error::malformed("missing request field");
        assert!(err.to_string().contains("malformed admission review"));
        assert!(err.to_string().contains("missing request field"));

        let err = Error::resolver("connection refused");
        assert!(err.to_string().contains("resolver error"));
        assert!(err.to_string().contains("connection refused"));

        let err = Error::config("TARGET_KIND not set");
        assert!(err.to_string().contains("TARGET_KIND"));
    }

    #[test]
    fn serde_errors_convert() {
        let err: Error = serde_json::from_str::<()>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    /// Story: resolver failures and missing ServiceAccounts are different things
    ///
    /// A missing ServiceAccount is a normal outcome ("no patch") and never
    /// becomes an Error. Only lookup failures the webhook cannot interpret
    /// reach this type, and those must fail the request rather than silently
    /// dropping the patch.
    #[test]
    fn story_resolver_errors_fail_closed() {
        fn handling(err: &Error) -> &'static str {
            match err {
                Error::MalformedReview(_) => "reject_request",
                Error::Kube(_) | Error::Resolver(_) => "deny_admission",
                Error::Serialization(_) | Error::SerializePatch(_) => "deny_admission",
                Error::Config(_) | Error::Internal(_) => "startup_failure",
            }
        }

        assert_eq!(handling(&Error::resolver("timeout")), "deny_admission");
        assert_eq!(handling(&Error::malformed("bad body")), "reject_request");
        assert_eq!(handling(&Error::config("missing env")), "startup_failure");
    }
}
