//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the session state machine and error types
//! that form the vocabulary of the study session domain.

mod auth;
mod errors;
mod ids;
mod session_state;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{EventId, SessionId, SubjectId, UserId};
pub use session_state::SessionState;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
