// Application configuration loaded from environment variables

use std::env;

use argon2::Params;
use thiserror::Error;
use tower_cookies::Key;

use crate::auth::PasswordService;

/// Minimum SESSION_SECRET length accepted for cookie signing
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("SESSION_SECRET must be at least {} bytes long", MIN_SESSION_SECRET_LEN)]
    SessionSecretTooShort,

    #[error("Invalid password hashing parameters: {0}")]
    InvalidHashParams(String),
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL; `None` runs on the in-memory store
    pub database_url: Option<String>,
    /// Cookie signing secret; `None` generates a key per process
    pub session_secret: Option<String>,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", &lookup, 8080)?,
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            session_secret: lookup("SESSION_SECRET").filter(|v| !v.is_empty()),
            hash_memory_kib: parse_or("HASH_MEMORY_KIB", &lookup, Params::DEFAULT_M_COST)?,
            hash_iterations: parse_or("HASH_ITERATIONS", &lookup, Params::DEFAULT_T_COST)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.session_secret {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::SessionSecretTooShort);
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Key used to sign session cookies
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) => {
                Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::SessionSecretTooShort)
            }
            None => {
                tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
                Ok(Key::generate())
            }
        }
    }

    pub fn password_service(&self) -> Result<PasswordService, ConfigError> {
        PasswordService::new(self.hash_memory_kib, self.hash_iterations)
            .map_err(|e| ConfigError::InvalidHashParams(e.to_string()))
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
