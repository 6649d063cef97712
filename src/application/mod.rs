//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (start, append, finish) and queries (active, by id, list) are
//! separate handlers sharing one `SessionStore`.

pub mod handlers;

pub use handlers::{
    AppendEventsCommand, AppendEventsHandler, AppendEventsResult, AppendTarget,
    FinishSessionCommand, FinishSessionHandler, GetActiveSessionHandler, GetActiveSessionQuery,
    GetSessionHandler, GetSessionQuery, ListSessionsHandler, ListSessionsQuery, SessionLifecycle,
    StartSessionCommand, StartSessionHandler, MAX_EVENTS_PER_APPEND,
};
