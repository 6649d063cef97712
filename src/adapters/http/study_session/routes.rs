//! HTTP routes for study session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::handlers::study_session::SessionLifecycle;

use super::handlers::{
    add_events, add_session_events, finish_session, get_active_session, get_session,
    list_sessions, start_session,
};

/// Study session router, meant to be nested under `/api/study-session`.
pub fn study_session_routes(lifecycle: SessionLifecycle) -> Router {
    Router::new()
        .route("/", get(list_sessions))
        .route("/start", post(start_session))
        .route("/add-events", post(add_events))
        .route("/finish", post(finish_session))
        .route("/active", get(get_active_session))
        .route("/:id", get(get_session))
        .route("/:id/events", post(add_session_events))
        .with_state(lifecycle)
}
