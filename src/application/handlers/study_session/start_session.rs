//! StartSessionHandler - Command handler for opening a study session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::study_session::{StudySession, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

/// Command to start a new study session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub user_id: UserId,
    pub title: String,
    pub notes: String,
    /// Defaults to now.
    pub started_at: Option<Timestamp>,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: StartSessionCommand) -> Result<StudySession, StudySessionError> {
        let started_at = cmd.started_at.unwrap_or_else(Timestamp::now);
        let session = StudySession::start(
            SessionId::new(),
            cmd.user_id.clone(),
            cmd.title,
            cmd.notes,
            started_at,
        )?;

        let created = self
            .store
            .create_session(&session)
            .await
            .map_err(store_failure("start_session", &cmd.user_id))?;

        tracing::info!(
            user_id = %cmd.user_id,
            session_id = %created.id(),
            "study session started"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::study_session::test_support::{user, MockSessionStore};
    use crate::domain::foundation::SessionState;
    use crate::domain::study_session::EventType;
    use crate::ports::SessionStoreError;

    fn command(title: &str) -> StartSessionCommand {
        StartSessionCommand {
            user_id: user("alice"),
            title: title.to_string(),
            notes: "past papers".to_string(),
            started_at: None,
        }
    }

    #[tokio::test]
    async fn starts_active_session_with_start_event() {
        let store = Arc::new(MockSessionStore::empty());
        let handler = StartSessionHandler::new(store.clone());

        let session = handler.handle(command("Physics")).await.unwrap();

        assert_eq!(session.title(), "Physics");
        assert_eq!(session.notes(), "past papers");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.events()[0].event_type(), EventType::Start);
        assert_eq!(store.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uses_supplied_start_time() {
        let store = Arc::new(MockSessionStore::empty());
        let handler = StartSessionHandler::new(store);
        let at = Timestamp::now().plus_secs(-600);

        let session = handler
            .handle(StartSessionCommand {
                started_at: Some(at),
                ..command("Physics")
            })
            .await
            .unwrap();

        assert_eq!(session.date(), &at);
        assert_eq!(session.events()[0].event_time(), &at);
    }

    #[tokio::test]
    async fn invalid_title_never_reaches_store() {
        let store = Arc::new(MockSessionStore::empty());
        let handler = StartSessionHandler::new(store.clone());

        let err = handler.handle(command("  ")).await.unwrap_err();

        assert!(matches!(err, StudySessionError::ValidationFailed { ref field, .. } if field == "title"));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn conflict_passes_through() {
        let store = Arc::new(MockSessionStore::failing(
            SessionStoreError::ActiveSessionExists,
        ));
        let handler = StartSessionHandler::new(store);

        let err = handler.handle(command("Physics")).await.unwrap_err();
        assert_eq!(err, StudySessionError::ActiveSessionExists);
    }

    #[tokio::test]
    async fn storage_failure_becomes_infrastructure() {
        let store = Arc::new(MockSessionStore::failing(SessionStoreError::Database(
            "connection reset".into(),
        )));
        let handler = StartSessionHandler::new(store);

        let err = handler.handle(command("Physics")).await.unwrap_err();
        assert!(matches!(err, StudySessionError::Infrastructure(_)));
    }
}
