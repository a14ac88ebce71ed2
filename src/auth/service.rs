// Authentication service - business logic layer

use std::sync::Arc;

use crate::auth::{
    error::AuthError,
    models::{User, UserPatch},
    password::PasswordService,
    repository::UserStore,
};

/// Authentication service coordinating signup, signin and credential changes
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    password_service: PasswordService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(users: Arc<dyn UserStore>, password_service: PasswordService) -> Self {
        Self {
            users,
            password_service,
        }
    }

    /// Register a new user
    ///
    /// 1. Rejects an email that is already in use
    /// 2. Salts and hashes the password
    /// 3. Creates the user with the stored `salt.digest`
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !self.users.find(email).await?.is_empty() {
            return Err(AuthError::EmailInUse);
        }

        let stored = self.hash_password(password).await?;
        let user = self.users.create(email, &stored).await?;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    /// Check credentials and return the matching user
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let mut users = self.users.find(email).await?;
        if users.len() > 1 {
            tracing::warn!("{} users share one email; using the first", users.len());
        }
        if users.is_empty() {
            return Err(AuthError::UserNotFound);
        }
        let user = users.swap_remove(0);

        if !self.verify_password(password, &user.password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!("User {} signed in", user.id);
        Ok(user)
    }

    /// Update email and/or password, hashing a new password before it is stored
    pub async fn update(
        &self,
        id: i32,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AuthError> {
        if let Some(email) = &email {
            let taken = self.users.find(email).await?.iter().any(|u| u.id != id);
            if taken {
                return Err(AuthError::EmailInUse);
            }
        }

        let password = match password {
            Some(plain) => Some(self.hash_password(&plain).await?),
            None => None,
        };

        let patch = UserPatch { email, password };
        if patch.is_empty() {
            return self.users.find_one(id).await?.ok_or(AuthError::UserNotFound);
        }

        let user = self.users.update(id, patch).await?;

        tracing::info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let service = self.password_service.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || service.hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let service = self.password_service.clone();
        let password = password.to_string();
        let stored = stored.to_string();

        tokio::task::spawn_blocking(move || service.verify_password(&password, &stored))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
    }
}
