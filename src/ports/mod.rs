//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - durable sessions, timelines and the active-session rule
//! - `SessionValidator` - bearer token validation against the identity provider

mod session_store;
mod session_validator;

pub use session_store::{SessionStore, SessionStoreError};
pub use session_validator::SessionValidator;
