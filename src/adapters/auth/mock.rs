//! Mock session validator for tests and local runs.
//!
//! Maps fixed token strings to users or to errors, so HTTP tests can
//! authenticate without a running identity provider.
//!
//! ```ignore
//! let validator = MockSessionValidator::new()
//!     .with_test_user("alice-token", "alice")
//!     .with_error("expired-token", AuthError::TokenExpired);
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, Result<AuthenticatedUser, AuthError>>>,
}

impl MockSessionValidator {
    /// Creates a validator that rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as the given user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.write().insert(token.into(), Ok(user));
        self
    }

    /// Accepts `token` as a generated user with the given id.
    ///
    /// An empty id is ignored and the token stays invalid.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        match UserId::new(user_id.clone()) {
            Ok(id) => {
                let user = AuthenticatedUser::new(
                    id,
                    format!("{}@test.example.com", user_id),
                    Some(format!("Test User {}", user_id)),
                    true,
                );
                self.with_user(token, user)
            }
            Err(_) => self,
        }
    }

    /// Makes `token` fail validation with `error`.
    pub fn with_error(self, token: impl Into<String>, error: AuthError) -> Self {
        self.write().insert(token.into(), Err(error));
        self
    }

    /// Registers a token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.write().insert(token.into(), Ok(user));
    }

    pub fn token_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Result<AuthenticatedUser, AuthError>>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Result<AuthenticatedUser, AuthError>>> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.read()
            .get(token)
            .cloned()
            .unwrap_or(Err(AuthError::InvalidToken))
    }
}
