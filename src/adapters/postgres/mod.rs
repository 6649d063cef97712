//! PostgreSQL adapters - Database implementations for the store port.
//!
//! - `PostgresSessionStore` - transactional session and timeline persistence
//! - `create_pool` / `run_migrations` / `health_check` - pool lifecycle

mod mapping;
mod pool;
mod session_store;

pub use pool::{create_pool, health_check, run_migrations};
pub use session_store::PostgresSessionStore;
