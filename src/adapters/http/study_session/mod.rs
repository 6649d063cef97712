//! HTTP adapter for study session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AppendEventsRequest, AppendEventsResponse, ErrorResponse, EventRequest, EventResponse,
    FinishSessionRequest, SessionResponse, StartSessionRequest, SubjectResponse,
};
pub use routes::study_session_routes;
