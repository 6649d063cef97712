//! Study session domain module.
//!
//! A session wraps a timeline of start, pause, resume and stop events.
//! Sessions are created Active and completed exactly once.

mod aggregate;
mod errors;
mod event;
mod subject;

pub use aggregate::{StudySession, MAX_TITLE_LENGTH};
pub use errors::StudySessionError;
pub use event::{EventType, NewSessionEvent, SessionEvent};
pub use subject::Subject;
