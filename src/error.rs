use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::envelope;
use crate::db::repo::RepoError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid payload")]
    InvalidPayload,

    #[error("User does not exist")]
    NotFound,

    #[error("Sorry. That email already exists")]
    EmailTaken,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Integrity(msg) => {
                tracing::debug!("Rejected by constraint: {}", msg);
                ApiError::InvalidPayload
            }
            RepoError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload | ApiError::EmailTaken => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                envelope::error("Internal server error", status)
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                envelope::error("Internal server error", status)
            }
            other => envelope::error(other.to_string(), status),
        }
    }
}
