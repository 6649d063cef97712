//! Application configuration
//!
//! Loaded from environment variables with the `STUDY_SESSIONS` prefix; nested
//! values are separated by `__`. A `.env` file is read first when present.
//!
//! ```no_run
//! use study_sessions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Keycloak realm used to validate bearer tokens
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// - `STUDY_SESSIONS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `STUDY_SESSIONS__DATABASE__URL=...` -> `database.url = ...`
    /// - `STUDY_SESSIONS__AUTH__KEYCLOAK_REALM=...` -> `auth.keycloak_realm = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` when a required variable is missing or
    /// a value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STUDY_SESSIONS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation across all sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
