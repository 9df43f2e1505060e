// region:    --- Imports
use crate::auction::lifecycle::LifecycleError;
use crate::bidding::commands::BidError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
// endregion: --- Imports

// region:    --- Api Error
/// Service-wide error type. Every handler returns `Result<_, ApiError>` and
/// the `IntoResponse` impl turns failures into `{"error", "code"}` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Bid(#[from] BidError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("{0}")]
    Upload(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Database(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Database(e) if is_unique_violation(e) => {
                (StatusCode::CONFLICT, "ALREADY_EXISTS")
            }
            ApiError::Database(_) | ApiError::Bcrypt(_) | ApiError::Io(_) | ApiError::Token(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
            ApiError::Bid(e) => match e {
                BidError::InvalidAuction => (StatusCode::NOT_FOUND, "INVALID_AUCTION"),
                BidError::AuctionNotActive => (StatusCode::BAD_REQUEST, "AUCTION_NOT_ACTIVE"),
                BidError::SelfBid => (StatusCode::BAD_REQUEST, "SELF_BID"),
                BidError::BidTooLow { .. } => (StatusCode::BAD_REQUEST, "BID_TOO_LOW"),
            },
            ApiError::Lifecycle(e) => match e {
                LifecycleError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                LifecycleError::NotPending => (StatusCode::CONFLICT, "NOT_PENDING"),
                LifecycleError::AlreadyFinished => (StatusCode::CONFLICT, "ALREADY_FINISHED"),
            },
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            ApiError::Upload(_) => (StatusCode::BAD_REQUEST, "UPLOAD"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{:<12} --> {}", "Error", self);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "code": code,
            })),
        )
            .into_response()
    }
}

/// Postgres unique constraint violations map to 409 rather than 500.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
// endregion: --- Api Error
