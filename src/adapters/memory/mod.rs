//! In-process adapters for tests and local runs.

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
