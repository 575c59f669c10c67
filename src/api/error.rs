use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::Error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// Validator verdict: every violated rule, not just the first
    ValidationFailed(Vec<String>),
    /// A deploy or rollback already holds the deployment lock
    Busy(String),
    /// Revision committed but the enforcement engine did not take it
    ActivationFailed { revision: u64, message: String },
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Busy(_) => StatusCode::CONFLICT,
            ApiError::ActivationFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_kind, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationFailed(errors) => (
                "validation_failed",
                format!("configuration failed validation with {} error(s)", errors.len()),
                Some(json!({ "errors": errors })),
            ),
            ApiError::Busy(msg) => ("busy", msg, None),
            ApiError::ActivationFailed { revision, message } => (
                "activation_failed",
                message,
                Some(json!({ "revision": revision })),
            ),
            ApiError::Internal(msg) => ("internal_error", msg, None),
        };

        (status, Json(ErrorBody { error: error_kind, message, details })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => ApiError::NotFound(err.to_string()),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidArgument(msg) => ApiError::BadRequest(msg),
            Error::ValidationFailed { errors } => ApiError::ValidationFailed(errors),
            Error::Busy => ApiError::Busy(err.to_string()),
            Error::ActivationFailed { revision, reason } => {
                ApiError::ActivationFailed { revision, message: reason }
            }
            Error::Serialization { .. } => ApiError::BadRequest(err.to_string()),
            Error::Config(msg) | Error::Transport(msg) | Error::Internal(msg) => {
                ApiError::Internal(msg)
            }
            Error::Io { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let api: ApiError = Error::not_found("domain", "example.com").into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);

        let api: ApiError = Error::Busy.into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);

        let api: ApiError = Error::ValidationFailed { errors: vec!["x".into()] }.into();
        assert_eq!(api.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let api: ApiError =
            Error::ActivationFailed { revision: 2, reason: "down".into() }.into();
        assert_eq!(api.status_code(), StatusCode::BAD_GATEWAY);
    }
}
