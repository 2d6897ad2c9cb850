use crate::models::{ErrorResponse, RequestStatus};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced by the matching engine and request lifecycle
///
/// Every variant maps onto one of five kinds (validation, not-found,
/// forbidden, conflict, repository) with enough structure for the
/// caller to render a response. Nothing here is retried locally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transition attempted on a non-PENDING request; reports the
    /// status the request currently holds
    #[error("Request already processed, current status: {0}")]
    AlreadyProcessed(RequestStatus),

    #[error("Repository error: {0}")]
    Repository(#[from] sqlx::Error),
}

impl Error {
    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::Conflict(_) => "conflict",
            Error::AlreadyProcessed(_) => "already_processed",
            Error::Repository(_) => "repository_error",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) | Error::AlreadyProcessed(_) => StatusCode::CONFLICT,
            Error::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
