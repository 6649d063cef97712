//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - bearer token validation (Keycloak JWKS, mock)
//! - `http` - axum routes, middleware and health report
//! - `memory` - in-process session store
//! - `postgres` - PostgreSQL session store, pool and migrations

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;

pub use auth::{KeycloakConfig, KeycloakSessionValidator, MockSessionValidator};
pub use memory::InMemorySessionStore;
pub use postgres::PostgresSessionStore;
