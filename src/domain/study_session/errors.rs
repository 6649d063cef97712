//! Study session error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use thiserror::Error;

/// Errors surfaced by the study session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudySessionError {
    /// The user already has an Active session.
    #[error("An active study session already exists")]
    ActiveSessionExists,

    /// No Active session for the user; also used when the target is Completed.
    #[error("Session not found or not active")]
    ActiveSessionNotFound,

    /// Session does not exist or is not visible to the caller.
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Storage or transport failure. The message is for logs only.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl StudySessionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StudySessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        StudySessionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StudySessionError::ActiveSessionExists => ErrorCode::ActiveSessionExists,
            StudySessionError::ActiveSessionNotFound => ErrorCode::ActiveSessionNotFound,
            StudySessionError::NotFound(_) => ErrorCode::SessionNotFound,
            StudySessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            StudySessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for StudySessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => StudySessionError::ValidationFailed {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            ErrorCode::ActiveSessionExists => StudySessionError::ActiveSessionExists,
            ErrorCode::ActiveSessionNotFound
            | ErrorCode::SessionCompleted
            | ErrorCode::InvalidStateTransition => StudySessionError::ActiveSessionNotFound,
            _ => StudySessionError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_domain_error_keeps_field() {
        let err: StudySessionError = DomainError::validation("title", "Title cannot be empty").into();
        assert_eq!(
            err,
            StudySessionError::validation("title", "Title cannot be empty")
        );
    }

    #[test]
    fn completed_session_maps_to_active_not_found() {
        let err: StudySessionError =
            DomainError::new(ErrorCode::SessionCompleted, "already completed").into();
        assert_eq!(err, StudySessionError::ActiveSessionNotFound);
    }

    #[test]
    fn other_domain_errors_become_infrastructure() {
        let err: StudySessionError = DomainError::new(ErrorCode::DatabaseError, "boom").into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[test]
    fn messages_read_well() {
        assert_eq!(
            StudySessionError::ActiveSessionExists.to_string(),
            "An active study session already exists"
        );
        assert_eq!(
            StudySessionError::ActiveSessionNotFound.to_string(),
            "Session not found or not active"
        );
    }
}
