use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{BroadcastRequest, BroadcastResponse, ReportKind},
    services,
};
use crate::{
    auth::extractors::AdminUser,
    error::ApiResult,
    extract::ValidJson,
    response::{self, Reply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/message", post(send_platform_message))
        .route("/admin/reports/:report_type", get(download_report))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.account_id))]
pub async fn send_platform_message(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<BroadcastRequest>,
) -> ApiResult<Reply<BroadcastResponse>> {
    let recipients = services::broadcast(&state, admin, &payload.message).await?;
    Ok(response::ok(
        "Platform message sent successfully.",
        BroadcastResponse { recipients },
    ))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.account_id))]
pub async fn download_report(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(report_type): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let kind: ReportKind = report_type.parse()?;
    let body = services::report(&state, kind).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", kind.filename()),
            ),
        ],
        body,
    ))
}
