//! Mapping from core errors to HTTP responses.

use api_shared::auth::AuthHeaderError;
use api_shared::ErrorRes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medicard_core::MedicardError;

/// Error returned by every handler.
///
/// Client errors carry their message to the caller. Server errors are logged in full and the
/// caller only sees a generic message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<MedicardError> for ApiError {
    fn from(err: MedicardError) -> Self {
        match err {
            MedicardError::InvalidInput(msg) => Self::bad_request(msg),
            MedicardError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", err.to_string())
            }
            MedicardError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "Conflict", msg),
            MedicardError::InvalidCredentials
            | MedicardError::InactiveAccount
            | MedicardError::Unauthenticated(_)
            | MedicardError::InvalidToken(_) => Self::unauthorized(err.to_string()),
            MedicardError::Forbidden(msg) => Self::forbidden(msg),
            other => {
                tracing::error!("Internal error: {:?}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred",
                )
            }
        }
    }
}

impl From<AuthHeaderError> for ApiError {
    fn from(err: AuthHeaderError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorRes {
            error: self.error.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (MedicardError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (MedicardError::not_found("patient", "MRN-1"), StatusCode::NOT_FOUND),
            (MedicardError::Conflict("dup".into()), StatusCode::CONFLICT),
            (MedicardError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (MedicardError::InactiveAccount, StatusCode::UNAUTHORIZED),
            (MedicardError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (MedicardError::Config("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn server_errors_hide_details() {
        let err = ApiError::from(MedicardError::PasswordHash("salt exploded".into()));
        assert!(!err.message.contains("salt"));
    }
}
