//! In-memory session store implementation.
//!
//! Keeps every session in a map behind a single async mutex, so each store
//! operation is one critical section. That makes the one-active-session
//! check and the following insert indivisible, matching the transactional
//! guarantees of the PostgreSQL store.
//!
//! Intended for tests and local development. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::study_session::{NewSessionEvent, SessionEvent, StudySession};
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, StudySession>>,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, in any state.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

fn active_for<'a>(
    sessions: &'a mut HashMap<SessionId, StudySession>,
    user_id: &UserId,
) -> Option<&'a mut StudySession> {
    sessions
        .values_mut()
        .find(|s| s.is_owned_by(user_id) && s.is_active())
}

fn append_to(
    session: &mut StudySession,
    events: &[NewSessionEvent],
) -> Result<Vec<SessionEvent>, SessionStoreError> {
    session
        .append_events(events.to_vec())
        .map_err(|_| SessionStoreError::ActiveSessionNotFound)?;
    Ok(session.events().to_vec())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        session: &StudySession,
    ) -> Result<StudySession, SessionStoreError> {
        let mut sessions = self.sessions.lock().await;

        if active_for(&mut sessions, session.user_id()).is_some() {
            return Err(SessionStoreError::ActiveSessionExists);
        }

        sessions.insert(*session.id(), session.clone());
        Ok(session.clone())
    }

    async fn get_active_session(
        &self,
        user_id: &UserId,
    ) -> Result<StudySession, SessionStoreError> {
        let mut sessions = self.sessions.lock().await;
        active_for(&mut sessions, user_id)
            .map(|s| s.clone())
            .ok_or(SessionStoreError::ActiveSessionNotFound)
    }

    async fn get_session_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<StudySession, SessionStoreError> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(*session_id))
    }

    async fn append_active_events(
        &self,
        user_id: &UserId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError> {
        let mut sessions = self.sessions.lock().await;
        let session =
            active_for(&mut sessions, user_id).ok_or(SessionStoreError::ActiveSessionNotFound)?;
        append_to(session, events)
    }

    async fn append_session_events(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .filter(|s| s.is_owned_by(user_id))
            .ok_or(SessionStoreError::NotFound(*session_id))?;
        append_to(session, events)
    }

    async fn finish_session(
        &self,
        user_id: &UserId,
        stop_event: &NewSessionEvent,
    ) -> Result<StudySession, SessionStoreError> {
        let mut sessions = self.sessions.lock().await;
        let session =
            active_for(&mut sessions, user_id).ok_or(SessionStoreError::ActiveSessionNotFound)?;
        session
            .finish(stop_event.clone())
            .map_err(|_| SessionStoreError::ActiveSessionNotFound)?;
        Ok(session.clone())
    }

    async fn list_sessions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudySession>, SessionStoreError> {
        let sessions = self.sessions.lock().await;
        let mut owned: Vec<StudySession> = sessions
            .values()
            .filter(|s| s.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.date()
                .cmp(a.date())
                .then_with(|| b.created_at().cmp(a.created_at()))
        });
        Ok(owned)
    }
}
