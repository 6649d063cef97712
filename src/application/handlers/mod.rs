//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod study_session;

pub use study_session::{
    AppendEventsCommand, AppendEventsHandler, AppendEventsResult, AppendTarget,
    FinishSessionCommand, FinishSessionHandler, GetActiveSessionHandler, GetActiveSessionQuery,
    GetSessionHandler, GetSessionQuery, ListSessionsHandler, ListSessionsQuery, SessionLifecycle,
    StartSessionCommand, StartSessionHandler, MAX_EVENTS_PER_APPEND,
};
