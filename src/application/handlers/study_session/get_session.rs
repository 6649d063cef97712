//! GetSessionHandler - Query handler for a single session by id.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::study_session::{StudySession, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

/// Query to get a session by ID.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
    pub user_id: UserId,
}

pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Sessions owned by someone else are reported as not found.
    pub async fn handle(&self, query: GetSessionQuery) -> Result<StudySession, StudySessionError> {
        let session = self
            .store
            .get_session_by_id(&query.session_id)
            .await
            .map_err(store_failure("get_session", &query.user_id))?;

        if !session.is_owned_by(&query.user_id) {
            tracing::warn!(
                user_id = %query.user_id,
                session_id = %query.session_id,
                "session requested by non-owner"
            );
            return Err(StudySessionError::NotFound(query.session_id));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::study_session::test_support::{
        active_session, user, MockSessionStore,
    };

    #[tokio::test]
    async fn owner_can_read_session() {
        let session = active_session("alice");
        let handler = GetSessionHandler::new(Arc::new(MockSessionStore::with_session(
            session.clone(),
        )));

        let found = handler
            .handle(GetSessionQuery {
                session_id: *session.id(),
                user_id: user("alice"),
            })
            .await
            .unwrap();

        assert_eq!(found.id(), session.id());
    }

    #[tokio::test]
    async fn other_users_get_not_found() {
        let session = active_session("alice");
        let handler = GetSessionHandler::new(Arc::new(MockSessionStore::with_session(
            session.clone(),
        )));

        let err = handler
            .handle(GetSessionQuery {
                session_id: *session.id(),
                user_id: user("mallory"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, StudySessionError::NotFound(*session.id()));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let handler = GetSessionHandler::new(Arc::new(MockSessionStore::empty()));
        let id = SessionId::new();

        let err = handler
            .handle(GetSessionQuery {
                session_id: id,
                user_id: user("alice"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, StudySessionError::NotFound(id));
    }
}
