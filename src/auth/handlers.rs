// HTTP handlers for the /auth endpoints

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{CredentialsRequest, FindUsersQuery, UpdateUserRequest, UserResponse},
    models::User,
    session::{CurrentUser, Session},
};
use crate::AppState;

/// Only the signed-in user may modify their own account
fn ensure_owner(current: &User, id: i32) -> Result<(), AuthError> {
    if current.id != id {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

/// Register a new user and sign them in
/// POST /auth/signup
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created and signed in", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email in use")
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::debug!("Signup request for {}", request.email);
    request.validate()?;

    let user = state.auth.signup(&request.email, &request.password).await?;
    session.set_user_id(user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Check credentials and sign in
/// POST /auth/signin
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 404, description = "No user with this email")
    ),
    tag = "auth"
)]
pub async fn signin_handler(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    tracing::debug!("Signin request for {}", request.email);
    request.validate()?;

    let user = state.auth.signin(&request.email, &request.password).await?;
    session.set_user_id(user.id);

    Ok(Json(user.into()))
}

/// Clear the session
/// POST /auth/signout
#[utoipa::path(
    post,
    path = "/auth/signout",
    responses((status = 204, description = "Signed out")),
    tag = "auth"
)]
pub async fn signout_handler(session: Session) -> StatusCode {
    session.clear();
    StatusCode::NO_CONTENT
}

/// Get the signed-in user
/// GET /auth/whoami
#[utoipa::path(
    get,
    path = "/auth/whoami",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in")
    ),
    tag = "auth"
)]
pub async fn whoami_handler(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

/// List users with the given email
/// GET /auth?email=
#[utoipa::path(
    get,
    path = "/auth",
    params(FindUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserResponse>),
        (status = 400, description = "Missing email parameter")
    ),
    tag = "users"
)]
pub async fn find_all_users_handler(
    State(state): State<AppState>,
    query: Result<Query<FindUsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    let Query(query) = query.map_err(|rejection| AuthError::BadRequest(rejection.body_text()))?;
    let users = state.users.find(&query.email).await?;
    tracing::debug!("Found {} users for {}", users.len(), query.email);

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by id
/// GET /auth/{id}
#[utoipa::path(
    get,
    path = "/auth/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn find_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AuthError> {
    tracing::debug!("Fetching user {}", id);

    let user = state.users.find_one(id).await?.ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}

/// Update a user's email and/or password
/// PATCH /auth/{id}
#[utoipa::path(
    patch,
    path = "/auth/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Signed in as a different user"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email in use")
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    tracing::debug!("Updating user {}", id);
    ensure_owner(&current, id)?;
    request.validate()?;

    let user = state.auth.update(id, request.email, request.password).await?;

    Ok(Json(user.into()))
}

/// Delete a user
/// DELETE /auth/{id}
#[utoipa::path(
    delete,
    path = "/auth/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User removed"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Signed in as a different user"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn remove_user_handler(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
) -> Result<StatusCode, AuthError> {
    tracing::debug!("Removing user {}", id);
    ensure_owner(&current, id)?;

    state.users.remove(id).await?;
    session.clear();

    tracing::info!("Removed user {}", id);
    Ok(StatusCode::NO_CONTENT)
}
