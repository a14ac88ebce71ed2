// Authentication module
// Salted-password signup/signin with cookie sessions and user management endpoints

pub mod error;
pub mod handlers;
pub mod memory_store;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    find_all_users_handler, find_user_handler, remove_user_handler, signin_handler,
    signout_handler, signup_handler, update_user_handler, whoami_handler,
};
pub use memory_store::InMemoryUserStore;
pub use models::{CredentialsRequest, UpdateUserRequest, User, UserPatch, UserResponse};
pub use password::PasswordService;
pub use repository::{PgUserStore, StoreError, UserStore};
pub use service::AuthService;
pub use session::{CurrentUser, Session, SESSION_COOKIE};
