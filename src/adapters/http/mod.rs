//! HTTP adapters - REST API implementations.

pub mod intake;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use intake::{intake_routes, IntakeHandlers};

/// Full API router: intake routes under `/api` with tracing, CORS and a
/// whole-request timeout.
pub fn api_router(handlers: IntakeHandlers, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", intake_routes(handlers)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
