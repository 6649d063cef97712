//! Keycloak adapter for JWT validation.
//!
//! Implements the `SessionValidator` port against a Keycloak realm:
//!
//! 1. Fetch the realm's JWKS (`{base}/realms/{realm}/protocol/openid-connect/certs`)
//! 2. Verify the JWT signature against the matching key
//! 3. Check issuer (`{base}/realms/{realm}`), audience and expiry
//! 4. Map claims to the domain `AuthenticatedUser`
//!
//! Keycloak access tokens often carry `aud: "account"` and name the client
//! in `azp`. A token is accepted for this client if either claim matches.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, TokenData, Validation,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Connection details for one Keycloak realm.
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// e.g. `https://sso.example.com`
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub jwks_cache_duration: Duration,
    pub request_timeout: Duration,
}

impl KeycloakConfig {
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            jwks_cache_duration: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!(
            "{}/realms/{}",
            self.base_url.trim_end_matches('/'),
            self.realm
        )
    }

    fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.issuer())
    }
}

impl From<&AuthConfig> for KeycloakConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            base_url: config.keycloak_base_url.clone(),
            realm: config.keycloak_realm.clone(),
            client_id: config.keycloak_client_id.clone(),
            jwks_cache_duration: config.jwks_cache_ttl(),
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeycloakClaims {
    sub: String,
    iss: String,
    #[serde(default)]
    aud: Audience,
    /// Authorized party: the client the token was issued to.
    #[serde(default)]
    azp: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

impl KeycloakClaims {
    fn issued_for(&self, client_id: &str) -> bool {
        self.aud.contains(client_id) || self.azp.as_deref() == Some(client_id)
    }
}

/// Audience can be a single string or array of strings in JWTs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == expected,
            Audience::Multiple(v) => v.iter().any(|s| s == expected),
        }
    }
}

struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, ttl: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// Keycloak session validator.
///
/// Keys are fetched lazily on the first validation and cached for
/// `jwks_cache_duration`. An unknown `kid` forces one refetch to pick up
/// rotated keys.
pub struct KeycloakSessionValidator {
    config: KeycloakConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl KeycloakSessionValidator {
    pub fn new(config: KeycloakConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        tracing::debug!(url = %url, "fetching JWKS");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch JWKS");
            AuthError::service_unavailable(format!("Failed to fetch JWKS: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "JWKS endpoint returned error status");
            return Err(AuthError::service_unavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse JWKS");
            AuthError::service_unavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!(keys = jwks.keys.len(), "fetched JWKS");
        Ok(jwks)
    }

    async fn get_jwks(&self, force_refresh: bool) -> Result<JwkSet, AuthError> {
        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        *self.jwks_cache.write().await =
            Some(JwksCache::new(jwks.clone(), self.config.jwks_cache_duration));
        Ok(jwks)
    }

    fn find_decoding_key(
        &self,
        kid: &str,
        jwks: &JwkSet,
    ) -> Option<Result<(DecodingKey, Algorithm), AuthError>> {
        let jwk = jwks.find(kid)?;

        let algorithm = match jwk.common.key_algorithm {
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS256) | None => Algorithm::RS256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(jsonwebtoken::jwk::KeyAlgorithm::ES256) => Algorithm::ES256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::ES384) => Algorithm::ES384,
            Some(other) => {
                tracing::warn!(algorithm = ?other, "unsupported JWK algorithm");
                return Some(Err(AuthError::InvalidToken));
            }
        };

        Some(
            DecodingKey::from_jwk(jwk)
                .map(|key| (key, algorithm))
                .map_err(|e| {
                    tracing::warn!(error = %e, "failed to build decoding key");
                    AuthError::InvalidToken
                }),
        )
    }

    fn validate_token(
        &self,
        token: &str,
        decoding_key: &DecodingKey,
        algorithm: Algorithm,
    ) -> Result<TokenData<KeycloakClaims>, AuthError> {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[self.config.issuer()]);
        // Audience is checked against both `aud` and `azp` after decoding.
        validation.validate_aud = false;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<KeycloakClaims>(token, decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("invalid issuer in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::warn!(error = %e, "token validation failed");
                    AuthError::InvalidToken
                }
            }
        })
    }
}

#[async_trait]
impl SessionValidator for KeycloakSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "failed to decode JWT header");
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("JWT missing 'kid' header");
            AuthError::InvalidToken
        })?;

        let jwks = self.get_jwks(false).await?;
        let (decoding_key, algorithm) = match self.find_decoding_key(&kid, &jwks) {
            Some(found) => found?,
            None => {
                let refreshed = self.get_jwks(true).await?;
                self.find_decoding_key(&kid, &refreshed).ok_or_else(|| {
                    tracing::warn!(kid = %kid, "no JWK matches token kid");
                    AuthError::InvalidToken
                })??
            }
        };

        let claims = self.validate_token(token, &decoding_key, algorithm)?.claims;

        if claims.iss != self.config.issuer() {
            return Err(AuthError::InvalidToken);
        }
        if !claims.issued_for(&self.config.client_id) {
            tracing::warn!(
                client_id = %self.config.client_id,
                aud = ?claims.aud,
                azp = ?claims.azp,
                "token not issued for this client"
            );
            return Err(AuthError::InvalidToken);
        }

        let user_id = UserId::new(claims.sub.clone()).map_err(|_| {
            tracing::warn!("token has empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            claims.email.unwrap_or_default(),
            claims.name.or(claims.preferred_username),
            claims.email_verified.unwrap_or(false),
        ))
    }
}

impl std::fmt::Debug for KeycloakSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakSessionValidator")
            .field("issuer", &self.config.issuer())
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}
