//! Study session command and query handlers.
//!
//! Every handler receives the acting `UserId` explicitly. Identity is
//! resolved once at the HTTP boundary; the handlers never look it up.

mod append_events;
mod finish_session;
mod get_active_session;
mod get_session;
mod list_sessions;
mod start_session;

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::study_session::StudySessionError;
use crate::ports::{SessionStore, SessionStoreError};

pub use append_events::{
    AppendEventsCommand, AppendEventsHandler, AppendEventsResult, AppendTarget,
    MAX_EVENTS_PER_APPEND,
};
pub use finish_session::{FinishSessionCommand, FinishSessionHandler};
pub use get_active_session::{GetActiveSessionHandler, GetActiveSessionQuery};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery};
pub use start_session::{StartSessionCommand, StartSessionHandler};

/// All lifecycle handlers wired to one store.
#[derive(Clone)]
pub struct SessionLifecycle {
    pub start: Arc<StartSessionHandler>,
    pub append_events: Arc<AppendEventsHandler>,
    pub finish: Arc<FinishSessionHandler>,
    pub get_active: Arc<GetActiveSessionHandler>,
    pub get: Arc<GetSessionHandler>,
    pub list: Arc<ListSessionsHandler>,
}

impl SessionLifecycle {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            start: Arc::new(StartSessionHandler::new(store.clone())),
            append_events: Arc::new(AppendEventsHandler::new(store.clone())),
            finish: Arc::new(FinishSessionHandler::new(store.clone())),
            get_active: Arc::new(GetActiveSessionHandler::new(store.clone())),
            get: Arc::new(GetSessionHandler::new(store.clone())),
            list: Arc::new(ListSessionsHandler::new(store)),
        }
    }
}

/// Converts a store failure, logging storage problems with context.
///
/// Conflicts and not-found outcomes are normal results and are not logged
/// at error level.
pub(crate) fn store_failure<'a>(
    operation: &'static str,
    user_id: &'a UserId,
) -> impl FnOnce(SessionStoreError) -> StudySessionError + 'a {
    move |err| {
        match &err {
            SessionStoreError::Database(detail) | SessionStoreError::Decode(detail) => {
                tracing::error!(operation, user_id = %user_id, error = %detail, "session store failure");
            }
            other => {
                tracing::debug!(operation, user_id = %user_id, outcome = %other, "session store rejected request");
            }
        }
        err.into()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-rolled store double for handler tests.

    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::foundation::{SessionId, Timestamp, UserId};
    use crate::domain::study_session::{NewSessionEvent, SessionEvent, StudySession};
    use crate::ports::{SessionStore, SessionStoreError};

    /// Records calls and answers with a fixed outcome.
    pub struct MockSessionStore {
        pub session: Option<StudySession>,
        pub failure: Option<SessionStoreError>,
        pub created: Mutex<Vec<StudySession>>,
        pub appended: Mutex<Vec<Vec<NewSessionEvent>>>,
        pub stops: Mutex<Vec<NewSessionEvent>>,
    }

    impl MockSessionStore {
        pub fn empty() -> Self {
            Self {
                session: None,
                failure: None,
                created: Mutex::new(Vec::new()),
                appended: Mutex::new(Vec::new()),
                stops: Mutex::new(Vec::new()),
            }
        }

        pub fn with_session(session: StudySession) -> Self {
            Self {
                session: Some(session),
                ..Self::empty()
            }
        }

        pub fn failing(err: SessionStoreError) -> Self {
            Self {
                failure: Some(err),
                ..Self::empty()
            }
        }

        fn check(&self) -> Result<(), SessionStoreError> {
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn current(&self) -> Result<StudySession, SessionStoreError> {
            self.session
                .clone()
                .ok_or(SessionStoreError::ActiveSessionNotFound)
        }
    }

    pub fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    pub fn active_session(owner: &str) -> StudySession {
        StudySession::start(SessionId::new(), user(owner), "Statistics", "", Timestamp::now())
            .unwrap()
    }

    #[async_trait]
    impl SessionStore for MockSessionStore {
        async fn create_session(
            &self,
            session: &StudySession,
        ) -> Result<StudySession, SessionStoreError> {
            self.check()?;
            self.created.lock().unwrap().push(session.clone());
            Ok(session.clone())
        }

        async fn get_active_session(
            &self,
            _user_id: &UserId,
        ) -> Result<StudySession, SessionStoreError> {
            self.check()?;
            self.current()
        }

        async fn get_session_by_id(
            &self,
            session_id: &SessionId,
        ) -> Result<StudySession, SessionStoreError> {
            self.check()?;
            self.session
                .clone()
                .filter(|s| s.id() == session_id)
                .ok_or(SessionStoreError::NotFound(*session_id))
        }

        async fn append_active_events(
            &self,
            _user_id: &UserId,
            events: &[NewSessionEvent],
        ) -> Result<Vec<SessionEvent>, SessionStoreError> {
            self.check()?;
            self.appended.lock().unwrap().push(events.to_vec());
            let mut session = self.current()?;
            session
                .append_events(events.to_vec())
                .map_err(|_| SessionStoreError::ActiveSessionNotFound)?;
            Ok(session.events().to_vec())
        }

        async fn append_session_events(
            &self,
            user_id: &UserId,
            _session_id: &SessionId,
            events: &[NewSessionEvent],
        ) -> Result<Vec<SessionEvent>, SessionStoreError> {
            self.append_active_events(user_id, events).await
        }

        async fn finish_session(
            &self,
            _user_id: &UserId,
            stop_event: &NewSessionEvent,
        ) -> Result<StudySession, SessionStoreError> {
            self.check()?;
            self.stops.lock().unwrap().push(stop_event.clone());
            let mut session = self.current()?;
            session
                .finish(stop_event.clone())
                .map_err(|_| SessionStoreError::ActiveSessionNotFound)?;
            Ok(session)
        }

        async fn list_sessions(
            &self,
            _user_id: &UserId,
        ) -> Result<Vec<StudySession>, SessionStoreError> {
            self.check()?;
            Ok(self.session.clone().into_iter().collect())
        }
    }
}
