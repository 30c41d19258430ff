use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateSwapRequest, SwapResponse, SwapsResponse, UpdateStatusRequest},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::ApiResult,
    extract::ValidJson,
    response::{self, Empty, Reply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swaps", post(create_swap))
        .route("/swaps/sent", get(list_sent))
        .route("/swaps/received", get(list_received))
        .route("/swaps/:id/status", put(update_status))
        .route("/swaps/:id", delete(delete_swap))
}

#[instrument(skip(state, session, payload), fields(sender = %session.account_id))]
pub async fn create_swap(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    ValidJson(payload): ValidJson<CreateSwapRequest>,
) -> ApiResult<Reply<SwapResponse>> {
    let swap = services::create(
        &state,
        session.account_id,
        payload.recipient_id,
        payload.skills_involved,
        payload.message,
    )
    .await?;
    Ok(response::created(
        "Swap request sent successfully!",
        SwapResponse { swap_request: swap },
    ))
}

#[instrument(skip(state, session), fields(account_id = %session.account_id))]
pub async fn list_sent(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> ApiResult<Reply<SwapsResponse>> {
    let swaps = services::list_sent(&state, session.account_id).await?;
    Ok(response::data(SwapsResponse { swap_requests: swaps }))
}

#[instrument(skip(state, session), fields(account_id = %session.account_id))]
pub async fn list_received(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> ApiResult<Reply<SwapsResponse>> {
    let swaps = services::list_received(&state, session.account_id).await?;
    Ok(response::data(SwapsResponse { swap_requests: swaps }))
}

#[instrument(skip(state, session, payload), fields(account_id = %session.account_id))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateStatusRequest>,
) -> ApiResult<Reply<SwapResponse>> {
    let target = payload.target()?;
    let swap = services::transition(&state, session.account_id, id, target).await?;
    Ok(response::ok(
        format!("Swap request {target} successfully."),
        SwapResponse { swap_request: swap },
    ))
}

#[instrument(skip(state, session), fields(account_id = %session.account_id))]
pub async fn delete_swap(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reply<Empty>> {
    services::delete(&state, session.account_id, id).await?;
    Ok(response::message("Swap request deleted successfully."))
}
