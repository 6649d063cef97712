//! AppendEventsHandler - Command handler for extending a session timeline.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::study_session::{NewSessionEvent, SessionEvent, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

/// Upper bound on events accepted in one request.
pub const MAX_EVENTS_PER_APPEND: usize = 500;

/// Which session receives the events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendTarget {
    /// The user's current Active session.
    Active,
    /// A specific session, which must belong to the user and be Active.
    Session(SessionId),
}

/// Command to append events.
#[derive(Debug, Clone)]
pub struct AppendEventsCommand {
    pub user_id: UserId,
    pub target: AppendTarget,
    pub events: Vec<NewSessionEvent>,
}

/// Full timeline after the append.
#[derive(Debug, Clone)]
pub struct AppendEventsResult {
    pub session_id: SessionId,
    pub events: Vec<SessionEvent>,
}

/// Handler for appending events.
pub struct AppendEventsHandler {
    store: Arc<dyn SessionStore>,
}

impl AppendEventsHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: AppendEventsCommand,
    ) -> Result<AppendEventsResult, StudySessionError> {
        if cmd.events.len() > MAX_EVENTS_PER_APPEND {
            return Err(StudySessionError::validation(
                "events",
                format!("At most {} events per request", MAX_EVENTS_PER_APPEND),
            ));
        }

        let event_count = cmd.events.len();
        let events = match cmd.target {
            AppendTarget::Active => self
                .store
                .append_active_events(&cmd.user_id, &cmd.events)
                .await
                .map_err(store_failure("append_active_events", &cmd.user_id))?,
            AppendTarget::Session(session_id) => self
                .store
                .append_session_events(&cmd.user_id, &session_id, &cmd.events)
                .await
                .map_err(store_failure("append_session_events", &cmd.user_id))?,
        };

        // A stored session always carries its Start event.
        let session_id = match (cmd.target, events.first()) {
            (AppendTarget::Session(id), _) => id,
            (AppendTarget::Active, Some(first)) => *first.session_id(),
            (AppendTarget::Active, None) => {
                tracing::error!(user_id = %cmd.user_id, "active session returned an empty timeline");
                return Err(StudySessionError::infrastructure(
                    "active session has no timeline",
                ));
            }
        };

        tracing::info!(
            user_id = %cmd.user_id,
            session_id = %session_id,
            event_count,
            "events appended"
        );
        Ok(AppendEventsResult { session_id, events })
    }
}
