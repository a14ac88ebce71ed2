pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    AuthService, CredentialsRequest, InMemoryUserStore, PasswordService, PgUserStore,
    UpdateUserRequest, UserResponse, UserStore,
};
use config::AppConfig;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::signin_handler,
        auth::handlers::signout_handler,
        auth::handlers::whoami_handler,
        auth::handlers::find_all_users_handler,
        auth::handlers::find_user_handler,
        auth::handlers::update_user_handler,
        auth::handlers::remove_user_handler,
    ),
    components(
        schemas(UserResponse, CredentialsRequest, UpdateUserRequest)
    ),
    tags(
        (name = "auth", description = "Signup, signin and session endpoints"),
        (name = "users", description = "User lookup and management endpoints")
    ),
    info(
        title = "User Auth API",
        version = "1.0.0",
        description = "Session-based user authentication with salted password hashing"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: Arc<dyn UserStore>,
    pub session_key: Key,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, password_service: PasswordService, session_key: Key) -> Self {
        Self {
            auth: AuthService::new(users.clone(), password_service),
            users,
            session_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

/// Creates and configures the application router
/// Maps the /auth endpoints to their handlers and adds cookie, trace and CORS layers
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/signin", post(auth::signin_handler))
        .route("/auth/signout", post(auth::signout_handler))
        .route("/auth/whoami", get(auth::whoami_handler))
        // User routes
        .route("/auth", get(auth::find_all_users_handler))
        .route(
            "/auth/:id",
            get(auth::find_user_handler)
                .patch(auth::update_user_handler)
                .delete(auth::remove_user_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CookieManagerLayer::new()),
        )
        .with_state(state)
}

/// Pick the user store: PostgreSQL when DATABASE_URL is set, memory otherwise
async fn create_user_store(config: &AppConfig) -> Arc<dyn UserStore> {
    match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");

            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("User Auth API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");
    let password_service = config
        .password_service()
        .expect("Invalid password hashing parameters");
    let session_key = config.session_key().expect("Invalid SESSION_SECRET");

    let users = create_user_store(&config).await;
    let app = create_router(AppState::new(users, password_service, session_key));

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("User Auth API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
