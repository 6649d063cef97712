//! GetActiveSessionHandler - Query handler for the user's open session.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::study_session::{StudySession, StudySessionError};
use crate::ports::SessionStore;

use super::store_failure;

#[derive(Debug, Clone)]
pub struct GetActiveSessionQuery {
    pub user_id: UserId,
}

pub struct GetActiveSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetActiveSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetActiveSessionQuery,
    ) -> Result<StudySession, StudySessionError> {
        self.store
            .get_active_session(&query.user_id)
            .await
            .map_err(store_failure("get_active_session", &query.user_id))
    }
}
