//! Draw handlers: allocate, recheck, pool summary.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AllocateRequest, AllocateResponse, RecheckRequest, RecheckResponse};
use crate::app_state::AppState;
use crate::error::{DrawError, ErrorResponse};
use crate::service::PoolSummary;

/// `POST /allocate` — Draw a recipient for a new registrant.
///
/// # Errors
///
/// Returns [`DrawError`] on blank fields, a repeat registrant, an exhausted
/// pool, or storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/allocate",
    tag = "Draw",
    summary = "Draw a recipient",
    description = "Draws a recipient for the registrant, excluding their own name, and records the assignment. `names` lists the pool as it was before the draw.",
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Recipient drawn", body = AllocateResponse),
        (status = 400, description = "Missing field or email already drew", body = ErrorResponse),
        (status = 404, description = "No eligible names remain", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn allocate(
    State(state): State<AppState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, DrawError> {
    let Json(req) = payload.map_err(reject)?;
    let allocation = state
        .draw_service
        .allocate(&req.email, &req.name, &req.password)
        .await?;
    Ok(Json(AllocateResponse::from(allocation)))
}

/// `POST /recheck` — Show a previously drawn recipient.
///
/// # Errors
///
/// Returns [`DrawError`] on blank fields, unknown credentials, or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/recheck",
    tag = "Draw",
    summary = "Recheck an assignment",
    description = "Returns the recipient drawn earlier for these credentials. Read-only.",
    request_body = RecheckRequest,
    responses(
        (status = 200, description = "Existing assignment", body = RecheckResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn recheck(
    State(state): State<AppState>,
    payload: Result<Json<RecheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, DrawError> {
    let Json(req) = payload.map_err(reject)?;
    let recipient = state
        .draw_service
        .recheck(&req.email, &req.password)
        .await?;
    Ok(Json(RecheckResponse::from(recipient)))
}

/// `GET /pool/summary` — Count unassigned names and assignments.
///
/// # Errors
///
/// Returns [`DrawError::Storage`] on read failure.
#[utoipa::path(
    get,
    path = "/api/v1/pool/summary",
    tag = "Draw",
    summary = "Pool summary",
    description = "Returns how many names are still in the pool and how many have been drawn.",
    responses(
        (status = 200, description = "Pool counts", body = PoolSummary),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn pool_summary(State(state): State<AppState>) -> Result<impl IntoResponse, DrawError> {
    let summary = state.draw_service.summary().await?;
    Ok(Json(summary))
}

/// Unreadable bodies are reported like any other invalid input.
fn reject(rejection: JsonRejection) -> DrawError {
    DrawError::Validation(rejection.body_text())
}

/// Draw routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/allocate", post(allocate))
        .route("/recheck", post(recheck))
        .route("/pool/summary", get(pool_summary))
}
