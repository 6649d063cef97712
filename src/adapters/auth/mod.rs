//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `keycloak` - JWT validation against a Keycloak realm's JWKS
//! - `mock` - fixed token table for tests and local runs

mod keycloak;
mod mock;

pub use keycloak::{KeycloakConfig, KeycloakSessionValidator};
pub use mock::MockSessionValidator;
