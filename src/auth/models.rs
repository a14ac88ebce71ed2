// User data models and DTOs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User database model
///
/// `password` holds the stored `salt.digest` form, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password: String,
}

/// User response model (excludes password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin@admin.com")]
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Signup / signin request DTO
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "admin@admin.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(example = "12341234")]
    pub password: String,
}

/// Partial update request DTO
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
}

/// Query string for `GET /auth?email=`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindUsersQuery {
    /// Exact email to match
    pub email: String,
}

/// Attributes handed to the store on update
///
/// A `password` here is already in stored form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}
