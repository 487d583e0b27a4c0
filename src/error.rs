// src/error.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Unique constraint guarding `users.email`.
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Duplicate email on registration
    #[error("Email already registered")]
    Conflict,

    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Token past its expiration date
    #[error("Token expired")]
    Forbidden,

    /// Malformed request payload
    #[error("{0}")]
    BadRequest(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Blocking task error: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),

    #[error("Database error: {0}")]
    Store(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT)
            {
                return ApiError::Conflict;
            }
        }
        ApiError::Store(err)
    }
}

impl ApiError {
    /// Message safe to hand back to the client.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Hashing(_) | ApiError::Blocking(_) | ApiError::Store(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Hashing(_) | ApiError::Blocking(_) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Hashing(_) | ApiError::Blocking(_) | ApiError::Store(_) => {
                tracing::error!("Internal service error: {}", self);
            }
            ApiError::Unauthorized | ApiError::Forbidden => {
                tracing::info!("Authorization error: {}", self);
            }
            _ => {
                tracing::debug!("Client error: {}", self);
            }
        }

        HttpResponse::build(self.status_code()).json(json!({"error": self.user_message()}))
    }
}
