use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::session::LoginFailure;
use crate::media::{ImageRejection, UploadError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Login(LoginFailure),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooLarge(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized(failure) => AppError::Login(failure),
            DomainError::Upstream(msg) => AppError::Upstream(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Rejected(r @ ImageRejection::TooLarge { .. }) => {
                AppError::TooLarge(r.to_string())
            }
            UploadError::Rejected(r) => AppError::BadRequest(r.to_string()),
            failed @ UploadError::Failed { .. } => AppError::Upstream(failed.to_string()),
        }
    }
}

fn login_status(failure: LoginFailure) -> StatusCode {
    match failure {
        LoginFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LoginFailure::EmailTaken => StatusCode::CONFLICT,
        LoginFailure::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        LoginFailure::NotAVendor
        | LoginFailure::AccountPending
        | LoginFailure::AccountBlocked
        | LoginFailure::NotAuthorized => StatusCode::FORBIDDEN,
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Login(f) => login_status(*f),
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Login(f) => json!({ "error": f.message(), "kind": f.kind() }),
            AppError::Unauthenticated => {
                json!({ "error": self.to_string(), "kind": "unauthenticated" })
            }
            AppError::Upstream(msg) => {
                log::warn!("upstream failure: {}", msg);
                json!({
                    "error": "A backend service is unavailable, please try again",
                    "kind": "provider_unavailable"
                })
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
