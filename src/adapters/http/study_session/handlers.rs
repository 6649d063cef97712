//! HTTP handlers for study session endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::study_session::{
    AppendEventsCommand, AppendEventsResult, AppendTarget, FinishSessionCommand,
    GetActiveSessionQuery, GetSessionQuery, ListSessionsQuery, SessionLifecycle,
    StartSessionCommand,
};
use crate::domain::foundation::{ErrorCode, SessionId, Timestamp, UserId};
use crate::domain::study_session::StudySessionError;

use super::dto::{
    AppendEventsRequest, AppendEventsResponse, ErrorResponse, EventResponse,
    FinishSessionRequest, SessionResponse, StartSessionRequest,
};

/// POST /api/study-session/start
pub async fn start_session(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    let cmd = StartSessionCommand {
        user_id: user.id,
        title: req.title,
        notes: req.notes,
        started_at: req.started_at.map(Timestamp::from_datetime),
    };

    match lifecycle.start.handle(cmd).await {
        Ok(session) => (StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_study_session_error(e),
    }
}

/// POST /api/study-session/add-events
pub async fn add_events(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<AppendEventsRequest>,
) -> Response {
    append(lifecycle, user.id, AppendTarget::Active, req).await
}

/// POST /api/study-session/:id/events
pub async fn add_session_events(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    Json(req): Json<AppendEventsRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    append(lifecycle, user.id, AppendTarget::Session(session_id), req).await
}

async fn append(
    lifecycle: SessionLifecycle,
    user_id: UserId,
    target: AppendTarget,
    req: AppendEventsRequest,
) -> Response {
    let events = match req.into_new_events() {
        Ok(events) => events,
        Err(e) => return handle_study_session_error(e),
    };

    let cmd = AppendEventsCommand {
        user_id,
        target,
        events,
    };

    match lifecycle.append_events.handle(cmd).await {
        Ok(AppendEventsResult { session_id, events }) => {
            let response = AppendEventsResponse {
                session_id: session_id.to_string(),
                events: events.iter().map(EventResponse::from).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_study_session_error(e),
    }
}

/// POST /api/study-session/finish
///
/// The body is optional; without one the session ends now.
pub async fn finish_session(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
    body: Bytes,
) -> Response {
    let req = match parse_finish_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let cmd = FinishSessionCommand {
        user_id: user.id,
        finished_at: req.finished_at.map(Timestamp::from_datetime),
        description: req.description,
    };

    match lifecycle.finish.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_study_session_error(e),
    }
}

/// GET /api/study-session/active
pub async fn get_active_session(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetActiveSessionQuery { user_id: user.id };

    match lifecycle.get_active.handle(query).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_study_session_error(e),
    }
}

/// GET /api/study-session/:id
pub async fn get_session(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let query = GetSessionQuery {
        session_id,
        user_id: user.id,
    };

    match lifecycle.get.handle(query).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_study_session_error(e),
    }
}

/// GET /api/study-session - newest first
pub async fn list_sessions(
    State(lifecycle): State<SessionLifecycle>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = ListSessionsQuery { user_id: user.id };

    match lifecycle.list.handle(query).await {
        Ok(sessions) => {
            let response: Vec<SessionResponse> =
                sessions.iter().map(SessionResponse::from).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_study_session_error(e),
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

/// The finish body is optional. An empty body means "now, no description";
/// anything else must be a valid `FinishSessionRequest`.
fn parse_finish_body(body: &[u8]) -> Result<FinishSessionRequest, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FinishSessionRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid request body: {}", e))),
        )
            .into_response()
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_study_session_error(error: StudySessionError) -> Response {
    let code = error.code();
    match error {
        StudySessionError::ActiveSessionExists => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(code, "An active study session already exists")),
        )
            .into_response(),
        StudySessionError::ActiveSessionNotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(code, "No active study session")),
        )
            .into_response(),
        StudySessionError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(code, format!("Study session not found: {}", id))),
        )
            .into_response(),
        StudySessionError::ValidationFailed { field, message } => (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new(ErrorCode::ValidationFailed, message)
                    .with_details(serde_json::json!({ "field": field })),
            ),
        )
            .into_response(),
        // Already logged with context by the lifecycle handler.
        StudySessionError::Infrastructure(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal()),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_session_exists_maps_to_409() {
        let response = handle_study_session_error(StudySessionError::ActiveSessionExists);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let response = handle_study_session_error(StudySessionError::ActiveSessionNotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = handle_study_session_error(StudySessionError::NotFound(SessionId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_failed_maps_to_400() {
        let error = StudySessionError::validation("title", "Title is required");
        let response = handle_study_session_error(error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let error = StudySessionError::infrastructure("connection reset by peer");
        let response = handle_study_session_error(error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_session_id_is_rejected() {
        let response = parse_session_id("not-a-uuid").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
