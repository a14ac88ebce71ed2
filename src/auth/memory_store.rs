// In-memory user store for tests and local development

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::models::{User, UserPatch};
use crate::auth::repository::{StoreError, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    next_id: i32,
}

/// User store kept in process memory
///
/// Email uniqueness is checked under the write lock, so concurrent signups
/// for one email cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            email: email.to_string(),
            password: password.to_string(),
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn find(&self, email: &str) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().filter(|u| u.email == email).cloned().collect())
    }

    async fn find_one(&self, id: i32) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update(&self, id: i32, patch: UserPatch) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(email) = &patch.email {
            if inner.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password) = patch.password {
            user.password = password;
        }

        Ok(user.clone())
    }

    async fn remove(&self, id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;
        inner.users.remove(index);

        Ok(())
    }
}
