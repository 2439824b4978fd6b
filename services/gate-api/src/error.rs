//! Error types for the gate API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hookgate_auth_core::{AuthError, CsrfReason, DenyReason, ExchangeRejection};
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Gate refused the request
    #[error("Access denied")]
    Denied(DenyReason),

    /// Password exchange refused
    #[error("Login rejected")]
    Rejected(ExchangeRejection),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Denied(DenyReason::Unauthorized) => StatusCode::FORBIDDEN,
            Self::Denied(_) => StatusCode::UNAUTHORIZED,
            Self::Rejected(ExchangeRejection::Csrf(_)) => StatusCode::FORBIDDEN,
            Self::Rejected(ExchangeRejection::NotPasswordProtected) => StatusCode::BAD_REQUEST,
            Self::Rejected(ExchangeRejection::WrongPassword) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Denied(DenyReason::Unauthorized) => "UNAUTHORIZED",
            Self::Denied(DenyReason::NotAuthenticated) => "NOT_AUTHENTICATED",
            Self::Denied(DenyReason::InvalidCredential) => "INVALID_CREDENTIAL",
            Self::Denied(DenyReason::PasswordRequired) => "PASSWORD_REQUIRED",
            Self::Rejected(ExchangeRejection::Csrf(reason)) => match reason {
                CsrfReason::MissingOrigin => "CSRF_MISSING_ORIGIN",
                CsrfReason::InvalidOrigin => "CSRF_INVALID_ORIGIN",
                CsrfReason::OriginNotAllowed => "CSRF_ORIGIN_NOT_ALLOWED",
                CsrfReason::MissingXrw => "CSRF_MISSING_XRW",
            },
            Self::Rejected(ExchangeRejection::NotPasswordProtected) => "NOT_PASSWORD_PROTECTED",
            Self::Rejected(ExchangeRejection::WrongPassword) => "INVALID_PASSWORD",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Auth(err) => err.error_code(),
        }
    }

    /// Message safe to show to clients
    fn public_message(&self) -> String {
        match self {
            Self::Auth(AuthError::NotFound(_)) => "Not found".to_string(),
            Self::Auth(AuthError::ExternalUnavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            Self::Auth(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
