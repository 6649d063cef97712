//! Authentication configuration (Keycloak realm)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Keycloak root URL, without the `/realms/...` suffix
    pub keycloak_base_url: String,

    pub keycloak_realm: String,

    /// Client the access tokens must be issued for
    pub keycloak_client_id: String,

    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,

    /// Timeout for calls to Keycloak
    #[serde(default = "default_timeout_ms")]
    pub keycloak_timeout_ms: u64,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.keycloak_timeout_ms)
    }

    /// In production the Keycloak URL must use HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.keycloak_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__KEYCLOAK_BASE_URL"));
        }
        if self.keycloak_realm.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__KEYCLOAK_REALM"));
        }
        if self.keycloak_client_id.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__KEYCLOAK_CLIENT_ID"));
        }
        if *environment == Environment::Production
            && !self.keycloak_base_url.starts_with("https://")
        {
            return Err(ValidationError::KeycloakMustBeHttps);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keycloak_base_url: "http://localhost:8088".to_string(),
            keycloak_realm: "myrealm".to_string(),
            keycloak_client_id: "myclient".to_string(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            keycloak_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_timeout_ms() -> u64 {
    10_000
}
