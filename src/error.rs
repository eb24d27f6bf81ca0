/*
 * Responsibility
 * - App-wide ApiError definition
 * - IntoResponse (HTTP status / JSON error body)
 * - Convert guard denials / repo errors into a uniform surface
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::guard::{AccessDenial, DenyReason};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{code}: {message}")]
    Unauthorized { code: &'static str, message: String },
    #[error("{code}: {message}")]
    Forbidden { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::Forbidden { code, message } => (StatusCode::FORBIDDEN, code, message),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

/// Guard denial -> HTTP surface.
///
/// 401 for anything credential-shaped (the client should re-authenticate, or
/// refresh on `EXPIRED_CREDENTIAL`), 403 for a valid identity that may not
/// perform the operation. Guard-internal failures are fail-closed 403s.
impl From<AccessDenial> for AppError {
    fn from(denial: AccessDenial) -> Self {
        match denial.reason {
            DenyReason::MissingCredential => AppError::Unauthorized {
                code: "MISSING_CREDENTIAL",
                message: "authentication required".into(),
            },
            DenyReason::ExpiredCredential => AppError::Unauthorized {
                code: "EXPIRED_CREDENTIAL",
                message: "access token expired".into(),
            },
            DenyReason::InvalidCredential => AppError::Unauthorized {
                code: "INVALID_CREDENTIAL",
                message: "invalid access token".into(),
            },
            DenyReason::MissingRole => AppError::Unauthorized {
                code: "MISSING_ROLE",
                message: "authenticated identity carries no role".into(),
            },
            DenyReason::InsufficientRole => AppError::Forbidden {
                code: "INSUFFICIENT_ROLE",
                message: "insufficient role for this operation".into(),
            },
            DenyReason::InternalGuardFailure => AppError::Forbidden {
                code: "ACCESS_CHECK_FAILED",
                message: "access check failed".into(),
            },
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(_) => AppError::Internal,
        }
    }
}
