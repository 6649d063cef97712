//! Row types and conversions between PostgreSQL and the session aggregate.
//!
//! A session is read back in one row: flat session columns plus the
//! timeline and subjects as `json_agg(...)::text` blobs. A NULL or empty blob
//! means "no entries".

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::foundation::{EventId, SessionId, SessionState, SubjectId, Timestamp, UserId};
use crate::domain::study_session::{EventType, SessionEvent, StudySession, Subject};
use crate::ports::SessionStoreError;

/// Flat session row with aggregated children.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudySessionRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub date: DateTime<Utc>,
    pub session_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub events: Option<String>,
    pub subjects: Option<String>,
}

/// One timeline entry, either selected directly or nested in the events blob.
#[derive(Debug, Deserialize, sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    pub description: Option<String>,
    pub device_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudySessionRow {
    pub fn into_session(self) -> Result<StudySession, SessionStoreError> {
        let events = decode_json_list::<EventRow>(self.events.as_deref(), "events")?
            .into_iter()
            .map(EventRow::into_event)
            .collect::<Result<Vec<_>, _>>()?;

        let subjects = decode_json_list::<SubjectRow>(self.subjects.as_deref(), "subjects")?
            .into_iter()
            .map(SubjectRow::into_subject)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StudySession::reconstitute(
            SessionId::from_uuid(self.id),
            parse_user_id(self.user_id)?,
            self.title,
            self.notes,
            Timestamp::from_datetime(self.date),
            parse_session_state(&self.session_state)?,
            events,
            subjects,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
        ))
    }
}

impl EventRow {
    pub fn into_event(self) -> Result<SessionEvent, SessionStoreError> {
        Ok(SessionEvent::reconstitute(
            EventId::from_uuid(self.id),
            SessionId::from_uuid(self.session_id),
            parse_event_type(&self.event_type)?,
            Timestamp::from_datetime(self.event_time),
            self.description,
            self.device_info,
        ))
    }
}

impl SubjectRow {
    pub fn into_subject(self) -> Result<Subject, SessionStoreError> {
        Ok(Subject::reconstitute(
            SubjectId::from_uuid(self.id),
            parse_user_id(self.user_id)?,
            self.name,
            self.description,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Decodes an aggregated JSON array; NULL, empty and whitespace mean none.
pub(crate) fn decode_json_list<T: DeserializeOwned>(
    raw: Option<&str>,
    what: &str,
) -> Result<Vec<T>, SessionStoreError> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| {
            SessionStoreError::Decode(format!("Failed to decode {}: {}", what, e))
        }),
    }
}

pub(crate) fn parse_session_state(s: &str) -> Result<SessionState, SessionStoreError> {
    s.parse()
        .map_err(|_| SessionStoreError::Decode(format!("Invalid session state: {}", s)))
}

pub(crate) fn parse_event_type(s: &str) -> Result<EventType, SessionStoreError> {
    s.parse()
        .map_err(|_| SessionStoreError::Decode(format!("Invalid event type: {}", s)))
}

fn parse_user_id(raw: String) -> Result<UserId, SessionStoreError> {
    UserId::new(raw).map_err(|e| SessionStoreError::Decode(format!("Invalid user_id: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(events: Option<&str>, subjects: Option<&str>) -> StudySessionRow {
        let at: DateTime<Utc> = "2024-03-01T09:00:00Z".parse().unwrap();
        StudySessionRow {
            id: Uuid::new_v4(),
            user_id: "kc-user-1".into(),
            title: "Calculus".into(),
            notes: String::new(),
            date: at,
            session_state: "active".into(),
            created_at: at,
            updated_at: at,
            events: events.map(String::from),
            subjects: subjects.map(String::from),
        }
    }

    #[test]
    fn missing_blobs_decode_to_empty_lists() {
        for raw in [None, Some(""), Some("   "), Some("null")] {
            let session = row(raw, raw).into_session().unwrap();
            assert!(session.events().is_empty());
            assert!(session.subjects().is_empty());
        }
    }

    #[test]
    fn malformed_blob_is_decode_error() {
        let err = row(Some("[{not json"), None).into_session().unwrap_err();
        assert!(matches!(err, SessionStoreError::Decode(msg) if msg.contains("events")));
    }

    #[test]
    fn events_blob_decodes_postgres_json_timestamps() {
        let session_id = Uuid::new_v4();
        let blob = format!(
            r#"[
                {{"id":"{a}","session_id":"{s}","event_type":"pause","event_time":"2024-03-01T09:30:00.123456+00:00","description":null,"device_info":"web"}},
                {{"id":"{b}","session_id":"{s}","event_type":"start","event_time":"2024-03-01T09:00:00+00:00","description":"go","device_info":null}}
            ]"#,
            a = Uuid::new_v4(),
            b = Uuid::new_v4(),
            s = session_id,
        );

        let session = row(Some(&blob), None).into_session().unwrap();
        let types: Vec<_> = session.events().iter().map(|e| e.event_type()).collect();

        assert_eq!(types, vec![EventType::Start, EventType::Pause]);
        assert_eq!(session.events()[0].description(), Some("go"));
        assert_eq!(session.events()[1].device_info(), Some("web"));
    }

    #[test]
    fn subjects_blob_decodes() {
        let blob = format!(
            r#"[{{"id":"{}","user_id":"kc-user-1","name":"Maths","description":null,"created_at":"2024-01-01T00:00:00+00:00","updated_at":"2024-01-01T00:00:00+00:00"}}]"#,
            Uuid::new_v4()
        );
        let session = row(None, Some(&blob)).into_session().unwrap();
        assert_eq!(session.subjects().len(), 1);
        assert_eq!(session.subjects()[0].name(), "Maths");
    }

    #[test]
    fn unknown_event_type_is_decode_error() {
        let blob = format!(
            r#"[{{"id":"{}","session_id":"{}","event_type":"nap","event_time":"2024-03-01T09:00:00+00:00","description":null,"device_info":null}}]"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let err = row(Some(&blob), None).into_session().unwrap_err();
        assert!(matches!(err, SessionStoreError::Decode(msg) if msg.contains("nap")));
    }

    #[test]
    fn unknown_state_is_decode_error() {
        let mut r = row(None, None);
        r.session_state = "paused".into();
        assert!(matches!(
            r.into_session(),
            Err(SessionStoreError::Decode(_))
        ));
    }

    #[test]
    fn state_strings_parse() {
        assert_eq!(parse_session_state("active").unwrap(), SessionState::Active);
        assert_eq!(
            parse_session_state("completed").unwrap(),
            SessionState::Completed
        );
    }
}
