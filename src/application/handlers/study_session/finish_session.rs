//! FinishSessionHandler - Command handler for completing the active session.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::study_session::{NewSessionEvent, StudySession, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

/// Command to finish the user's active session.
#[derive(Debug, Clone)]
pub struct FinishSessionCommand {
    pub user_id: UserId,
    /// Defaults to now.
    pub finished_at: Option<Timestamp>,
    /// Stored on the Stop event.
    pub description: Option<String>,
}

pub struct FinishSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl FinishSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: FinishSessionCommand,
    ) -> Result<StudySession, StudySessionError> {
        let finished_at = cmd.finished_at.unwrap_or_else(Timestamp::now);
        let stop = NewSessionEvent::stop(finished_at, cmd.description);

        let session = self
            .store
            .finish_session(&cmd.user_id, &stop)
            .await
            .map_err(store_failure("finish_session", &cmd.user_id))?;

        tracing::info!(
            user_id = %cmd.user_id,
            session_id = %session.id(),
            "study session finished"
        );
        Ok(session)
    }
}
