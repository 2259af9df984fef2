use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Reasons a form submission is rejected. The messages are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingRegistrationFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Username already taken.")]
    UsernameTaken,

    #[error("Missing fields")]
    MissingProductFields,

    #[error("Missing name or image")]
    MissingCategoryFields,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist; the payload names what was looked up.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("blocking store task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Token(_) | StoreError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            StoreError::NotFound(_) => HttpResponse::NotFound().json(self.to_string()),
            StoreError::Validation(_) | StoreError::InvalidCredentials => {
                HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
            }
            _ => {
                log::error!("{}", self);
                HttpResponse::InternalServerError().json("Internal Server Error")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of hours, got {value:?}")]
    InvalidTtl { name: &'static str, value: String },
}
