//! StudySession aggregate entity.
//!
//! A study session is an open/close envelope around an append-only event
//! timeline. Sessions are created Active by `start`, move to Completed
//! exactly once through `finish`, and are never deleted.
//!
//! # Invariants
//!
//! - `title` is 1-500 characters after trimming
//! - the timeline starts with the Start event recorded at creation
//! - events are ordered by `event_time`, ties keep insertion order
//! - a Completed session accepts no further events
//!
//! The per-user "one active session" rule spans aggregates and is enforced
//! by the `SessionStore`, not here.

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionState, StateMachine, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::event::{EventType, NewSessionEvent, SessionEvent};
use super::subject::Subject;

/// Maximum length for session title.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Study session aggregate with its timeline and linked subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    id: SessionId,
    user_id: UserId,
    title: String,
    notes: String,
    /// Instant the session was started; independent of later event times.
    date: Timestamp,
    state: SessionState,
    events: Vec<SessionEvent>,
    subjects: Vec<Subject>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl StudySession {
    /// Opens a new Active session with its Start event at `started_at`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if title is empty or too long
    pub fn start(
        id: SessionId,
        user_id: UserId,
        title: impl Into<String>,
        notes: impl Into<String>,
        started_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        Self::validate_title(&title)?;

        let start = NewSessionEvent::new(EventType::Start, started_at).record(id);
        let now = Timestamp::now();

        Ok(Self {
            id,
            user_id,
            title,
            notes: notes.into(),
            date: started_at,
            state: SessionState::Active,
            events: vec![start],
            subjects: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    ///
    /// Events are re-sorted by time; ties keep the order they were given in.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        title: String,
        notes: String,
        date: Timestamp,
        state: SessionState,
        mut events: Vec<SessionEvent>,
        subjects: Vec<Subject>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        sort_timeline(&mut events);
        Self {
            id,
            user_id,
            title,
            notes,
            date,
            state,
            events,
            subjects,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn date(&self) -> &Timestamp {
        &self.date
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Timeline in chronological order.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns true if the given user owns this session.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Records new timeline entries and returns them with their assigned ids.
    ///
    /// An empty batch is accepted and changes nothing.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session is no longer active
    pub fn append_events(
        &mut self,
        events: Vec<NewSessionEvent>,
    ) -> Result<Vec<SessionEvent>, DomainError> {
        self.ensure_active()?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let recorded: Vec<SessionEvent> = events.into_iter().map(|e| e.record(self.id)).collect();
        self.events.extend(recorded.iter().cloned());
        sort_timeline(&mut self.events);
        self.updated_at = Timestamp::now();
        Ok(recorded)
    }

    /// Completes the session, recording the given Stop event.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session was already finished
    pub fn finish(&mut self, stop: NewSessionEvent) -> Result<SessionEvent, DomainError> {
        self.ensure_active()?;
        self.state = self
            .state
            .transition_to(SessionState::Completed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;

        let recorded = stop.record(self.id);
        self.events.push(recorded.clone());
        sort_timeline(&mut self.events);
        self.updated_at = Timestamp::now();
        Ok(recorded)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), DomainError> {
        if !self.state.is_active() {
            return Err(DomainError::new(
                ErrorCode::SessionCompleted,
                format!("Session {} is already completed", self.id),
            ));
        }
        Ok(())
    }

    /// Validates a session title.
    pub fn validate_title(title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Title cannot exceed {} characters", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }
}

/// Stable sort by event time.
fn sort_timeline(events: &mut [SessionEvent]) {
    events.sort_by(|a, b| a.event_time().cmp(b.event_time()));
}
