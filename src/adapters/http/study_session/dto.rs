//! HTTP DTOs for study session endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, SessionState, Timestamp};
use crate::domain::study_session::{
    EventType, NewSessionEvent, SessionEvent, StudySession, StudySessionError, Subject,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /start`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    /// Defaults to the server clock.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// One timeline entry as sent by a client.
///
/// `event_type` stays a string here so an unknown kind is reported as a
/// validation failure rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub device_info: Option<String>,
}

impl EventRequest {
    pub fn into_new_event(self) -> Result<NewSessionEvent, StudySessionError> {
        let event_type: EventType = self.event_type.parse().map_err(DomainError::from)?;
        Ok(NewSessionEvent {
            event_type,
            event_time: Timestamp::from_datetime(self.event_time),
            description: self.description,
            device_info: self.device_info,
        })
    }
}

/// Body of `POST /add-events` and `POST /:id/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendEventsRequest {
    #[serde(default)]
    pub events: Vec<EventRequest>,
}

impl AppendEventsRequest {
    /// Converts every entry, failing on the first malformed one.
    pub fn into_new_events(self) -> Result<Vec<NewSessionEvent>, StudySessionError> {
        self.events
            .into_iter()
            .map(EventRequest::into_new_event)
            .collect()
    }
}

/// Body of `POST /finish`. The body may be omitted entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinishSessionRequest {
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub session_id: String,
    pub event_type: EventType,
    pub event_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
}

impl From<&SessionEvent> for EventResponse {
    fn from(event: &SessionEvent) -> Self {
        Self {
            id: event.id().to_string(),
            session_id: event.session_id().to_string(),
            event_type: event.event_type(),
            event_time: event.event_time().as_datetime().to_rfc3339(),
            description: event.description().map(str::to_string),
            device_info: event.device_info().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Subject> for SubjectResponse {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id().to_string(),
            name: subject.name().to_string(),
            description: subject.description().map(str::to_string),
        }
    }
}

/// Full session aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub date: String,
    pub state: SessionState,
    pub events: Vec<EventResponse>,
    pub subjects: Vec<SubjectResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&StudySession> for SessionResponse {
    fn from(session: &StudySession) -> Self {
        Self {
            id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            title: session.title().to_string(),
            notes: session.notes().to_string(),
            date: session.date().as_datetime().to_rfc3339(),
            state: session.state(),
            events: session.events().iter().map(EventResponse::from).collect(),
            subjects: session.subjects().iter().map(SubjectResponse::from).collect(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            updated_at: session.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Result of an append: the target session and its full timeline.
#[derive(Debug, Clone, Serialize)]
pub struct AppendEventsResponse {
    pub session_id: String,
    pub events: Vec<EventResponse>,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
