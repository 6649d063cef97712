//! SessionState enum for the study session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle state of a study session.
///
/// `Active -> Completed` is the only edge; completed sessions are never
/// re-activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Active,
    Completed,
}

impl SessionState {
    /// Returns true if events may still be appended.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Completed => "completed",
        }
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (SessionState::Active, SessionState::Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            SessionState::Active => vec![SessionState::Completed],
            SessionState::Completed => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionState::Active),
            "completed" => Ok(SessionState::Completed),
            other => Err(ValidationError::invalid_format(
                "session_state",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_active() {
        assert_eq!(SessionState::default(), SessionState::Active);
    }

    #[test]
    fn active_can_complete() {
        assert!(SessionState::Active.can_transition_to(&SessionState::Completed));
        assert_eq!(
            SessionState::Active.transition_to(SessionState::Completed).unwrap(),
            SessionState::Completed
        );
    }

    #[test]
    fn completed_is_terminal() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Completed
            .transition_to(SessionState::Active)
            .is_err());
    }

    #[test]
    fn active_cannot_transition_to_itself() {
        assert!(!SessionState::Active.can_transition_to(&SessionState::Active));
    }

    #[test]
    fn parses_storage_strings() {
        assert_eq!("active".parse::<SessionState>().unwrap(), SessionState::Active);
        assert_eq!(
            "completed".parse::<SessionState>().unwrap(),
            SessionState::Completed
        );
        assert!("archived".parse::<SessionState>().is_err());
        assert!("Active".parse::<SessionState>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionState::Completed).unwrap(),
            "\"completed\""
        );
    }
}
