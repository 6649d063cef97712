//! HTTP adapters - REST API over the session lifecycle.
//!
//! [`app_router`] assembles every route and the middleware stack, so the
//! binary and the integration tests serve the same application.

pub mod health;
pub mod middleware;
pub mod study_session;

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::handlers::study_session::SessionLifecycle;
use crate::config::ServerConfig;

pub use health::{health_routes, HealthState};
pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use study_session::study_session_routes;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the full application router.
///
/// Layers, outermost first: CORS, request id, tracing, request id
/// propagation, timeout. A timed-out request drops its handler future, which
/// rolls back any open transaction.
pub fn app_router(
    lifecycle: SessionLifecycle,
    validator: AuthState,
    health: HealthState,
    config: &ServerConfig,
) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = study_session_routes(lifecycle).layer(axum::middleware::from_fn_with_state(
        validator,
        auth_middleware,
    ));

    Router::new()
        .merge(health_routes(health))
        .nest("/api/study-session", api)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors_layer(config))
}

/// CORS for the configured origins. Origins that are not valid header
/// values are skipped with a warning.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
