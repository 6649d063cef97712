//! Timeline entries of a study session.
//!
//! Events are immutable facts. Once recorded they are never edited or
//! removed; a session's history only grows.

use crate::domain::foundation::{EventId, SessionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventType {
    Start,
    Pause,
    Resume,
    Stop,
}

impl EventType {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::Pause => "pause",
            EventType::Resume => "resume",
            EventType::Stop => "stop",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(EventType::Start),
            "pause" => Ok(EventType::Pause),
            "resume" => Ok(EventType::Resume),
            "stop" => Ok(EventType::Stop),
            other => Err(ValidationError::invalid_format(
                "event_type",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// Caller-supplied event that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionEvent {
    pub event_type: EventType,
    pub event_time: Timestamp,
    pub description: Option<String>,
    pub device_info: Option<String>,
}

impl NewSessionEvent {
    pub fn new(event_type: EventType, event_time: Timestamp) -> Self {
        Self {
            event_type,
            event_time,
            description: None,
            device_info: None,
        }
    }

    /// Stop marker recorded when a session is finished.
    pub fn stop(event_time: Timestamp, description: Option<String>) -> Self {
        Self {
            description,
            ..Self::new(EventType::Stop, event_time)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_device_info(mut self, device_info: impl Into<String>) -> Self {
        self.device_info = Some(device_info.into());
        self
    }

    /// Assigns a fresh id and binds the event to a session.
    pub fn record(self, session_id: SessionId) -> SessionEvent {
        SessionEvent {
            id: EventId::new(),
            session_id,
            event_type: self.event_type,
            event_time: self.event_time,
            description: self.description,
            device_info: self.device_info,
        }
    }
}

/// A recorded, immutable timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    id: EventId,
    session_id: SessionId,
    event_type: EventType,
    event_time: Timestamp,
    description: Option<String>,
    device_info: Option<String>,
}

impl SessionEvent {
    /// Rebuilds an event read back from storage.
    pub fn reconstitute(
        id: EventId,
        session_id: SessionId,
        event_type: EventType,
        event_time: Timestamp,
        description: Option<String>,
        device_info: Option<String>,
    ) -> Self {
        Self {
            id,
            session_id,
            event_type,
            event_time,
            description,
            device_info,
        }
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn event_time(&self) -> &Timestamp {
        &self.event_time
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn device_info(&self) -> Option<&str> {
        self.device_info.as_deref()
    }
}
