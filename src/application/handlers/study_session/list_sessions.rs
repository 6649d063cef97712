//! ListSessionsHandler - Query handler for a user's session history.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::study_session::{StudySession, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

#[derive(Debug, Clone)]
pub struct ListSessionsQuery {
    pub user_id: UserId,
}

pub struct ListSessionsHandler {
    store: Arc<dyn SessionStore>,
}

impl ListSessionsHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// All sessions of the user, newest first.
    pub async fn handle(
        &self,
        query: ListSessionsQuery,
    ) -> Result<Vec<StudySession>, StudySessionError> {
        self.store
            .list_sessions(&query.user_id)
            .await
            .map_err(store_failure("list_sessions", &query.user_id))
    }
}
