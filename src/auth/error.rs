// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::repository::StoreError;
use crate::error::ErrorResponse;

/// Errors surfaced by the auth service and the `/auth` handlers
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup (or email change) with an email another user already has
    #[error("Email in use")]
    EmailInUse,

    /// No user for the given email or id
    #[error("User not found")]
    UserNotFound,

    /// Email exists but the password does not verify
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No user bound to the current session
    #[error("Not signed in")]
    Unauthenticated,

    /// Signed in, but acting on another user's account
    #[error("Forbidden")]
    Forbidden,

    /// Malformed query string or path
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AuthError::UserNotFound,
            StoreError::DuplicateEmail(_) => AuthError::EmailInUse,
            StoreError::Database(e) => AuthError::DatabaseError(e.to_string()),
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailInUse => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the client-facing body, logging at a level matching the severity
    ///
    /// Server-side failures are logged in full but only a generic message
    /// reaches the client.
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AuthError::EmailInUse => {
                warn!("Signup rejected: email in use");
                ErrorResponse::new("EMAIL_IN_USE", "Email in use")
            }
            AuthError::UserNotFound => {
                debug!("User not found");
                ErrorResponse::new("NOT_FOUND", "User not found")
            }
            AuthError::InvalidCredentials => {
                warn!("Signin rejected: invalid credentials");
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid email or password")
            }
            AuthError::Unauthenticated => {
                debug!("Request without an authenticated session");
                ErrorResponse::new("UNAUTHENTICATED", "Not signed in")
            }
            AuthError::Forbidden => {
                warn!("Request for another user's account rejected");
                ErrorResponse::new("FORBIDDEN", "Not allowed to modify this user")
            }
            AuthError::BadRequest(msg) => {
                debug!("Bad request: {}", msg);
                ErrorResponse::new("BAD_REQUEST", msg.clone())
            }
            AuthError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed").with_details(
                    serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                )
            }
            AuthError::DatabaseError(msg) => {
                error!("Database error in auth: {}", msg);
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
            }
            AuthError::PasswordHashError(msg) => {
                error!("Password hashing error: {}", msg);
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
            AuthError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.to_error_response())).into_response()
    }
}
