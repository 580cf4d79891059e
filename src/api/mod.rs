//! REST API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.
//!
//! Draw endpoints are mounted under `/api/v1`; system endpoints at the root.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::DrawError;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "recipient-draw", description = "Draw a recipient for each registrant from a seeded name pool."),
    paths(
        handlers::draw::allocate,
        handlers::draw::recheck,
        handlers::draw::pool_summary,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::AllocateRequest,
        dto::AllocateResponse,
        dto::RecheckRequest,
        dto::RecheckResponse,
        crate::service::PoolSummary,
        crate::error::ErrorResponse,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Draw", description = "Allocation and recheck"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the served application: routes, middleware, and state.
///
/// `request_timeout` bounds every request end to end.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    with_middleware(router, request_timeout).with_state(state)
}

/// Wraps a router in the timeout, trace and CORS layers.
fn with_middleware<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Gives the bare 408 from the timeout layer the usual error body.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return DrawError::Timeout.into_response();
    }
    response
}
