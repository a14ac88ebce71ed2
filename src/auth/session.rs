// Cookie-backed session and current-user extractors

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};

use crate::auth::{error::AuthError, models::User, repository::UserStore};

/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "session";

/// Request-scoped session state
///
/// The signed `session` cookie carries the signed-in user's id. Requires
/// `CookieManagerLayer` on the router.
pub struct Session {
    cookies: Cookies,
    key: Key,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AuthError::Internal(msg.to_string()))?;

        Ok(Self {
            cookies,
            key: <Key as FromRef<S>>::from_ref(state),
        })
    }
}

impl Session {
    /// Id of the signed-in user, if the cookie is present and its signature checks out
    pub fn user_id(&self) -> Option<i32> {
        let cookie = self.cookies.signed(&self.key).get(SESSION_COOKIE)?;
        match cookie.value().parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Session cookie has a non-numeric user id");
                None
            }
        }
    }

    pub fn set_user_id(&self, user_id: i32) {
        let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        self.cookies.signed(&self.key).add(cookie);
    }

    /// Sign out: drop the user id from the session
    pub fn clear(&self) {
        let cookie = Cookie::build(SESSION_COOKIE).path("/").build();
        self.cookies.signed(&self.key).remove(cookie);
    }
}

/// The user bound to the current session
///
/// Rejects with `Unauthenticated` when there is no session user or the user
/// no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Key: FromRef<S>,
    Arc<dyn UserStore>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let user_id = session.user_id().ok_or(AuthError::Unauthenticated)?;

        let users = <Arc<dyn UserStore> as FromRef<S>>::from_ref(state);
        match users.find_one(user_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::warn!("Session refers to missing user {}", user_id);
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
