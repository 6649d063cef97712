//! Session store port.
//!
//! The store is the single owner of persisted sessions and their timelines.
//! Every operation is atomic: it either applies all of its writes or none.
//!
//! # Single active session
//!
//! At most one Active session may exist per user. Implementations must make
//! the "is there an Active session" check and the write that depends on it
//! indivisible with respect to concurrent calls for the same user, without
//! blocking calls for other users.

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::study_session::{
    NewSessionEvent, SessionEvent, StudySession, StudySessionError,
};
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a `SessionStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionStoreError {
    #[error("active session already exists")]
    ActiveSessionExists,

    #[error("session not found or not active")]
    ActiveSessionNotFound,

    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// A stored row could not be turned back into an aggregate.
    #[error("failed to decode stored session: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<SessionStoreError> for StudySessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::ActiveSessionExists => StudySessionError::ActiveSessionExists,
            SessionStoreError::ActiveSessionNotFound => StudySessionError::ActiveSessionNotFound,
            SessionStoreError::NotFound(id) => StudySessionError::NotFound(id),
            other @ (SessionStoreError::Decode(_) | SessionStoreError::Database(_)) => {
                StudySessionError::Infrastructure(other.to_string())
            }
        }
    }
}

/// Persistence port for study sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly started session together with its Start event.
    ///
    /// # Errors
    ///
    /// - `ActiveSessionExists` if the owner already has an Active session;
    ///   nothing is written in that case
    /// - `Database` on persistence failure
    async fn create_session(&self, session: &StudySession)
        -> Result<StudySession, SessionStoreError>;

    /// Load the user's Active session with its full timeline.
    ///
    /// # Errors
    ///
    /// - `ActiveSessionNotFound` if the user has no Active session
    async fn get_active_session(&self, user_id: &UserId)
        -> Result<StudySession, SessionStoreError>;

    /// Load any session, regardless of owner or state.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no session has this id
    async fn get_session_by_id(&self, session_id: &SessionId)
        -> Result<StudySession, SessionStoreError>;

    /// Append events to the user's Active session.
    ///
    /// Returns the full, ordered timeline after the append. An empty batch
    /// writes nothing but still requires an Active session.
    ///
    /// # Errors
    ///
    /// - `ActiveSessionNotFound` if the user has no Active session
    async fn append_active_events(
        &self,
        user_id: &UserId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError>;

    /// Append events to a specific session owned by the user.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist or belongs to someone else
    /// - `ActiveSessionNotFound` if the session is Completed
    async fn append_session_events(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError>;

    /// Complete the user's Active session, recording the Stop event.
    ///
    /// # Errors
    ///
    /// - `ActiveSessionNotFound` if the user has no Active session
    async fn finish_session(
        &self,
        user_id: &UserId,
        stop_event: &NewSessionEvent,
    ) -> Result<StudySession, SessionStoreError>;

    /// All of the user's sessions, newest `date` first.
    async fn list_sessions(&self, user_id: &UserId)
        -> Result<Vec<StudySession>, SessionStoreError>;

    /// Reachability probe for health reporting. Stores without a backing
    /// service are always reachable.
    async fn ping(&self) -> Result<(), SessionStoreError> {
        Ok(())
    }
}
