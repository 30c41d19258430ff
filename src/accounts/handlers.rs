use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AccountView, BrowseQuery, UpdateProfileRequest, UserResponse, UsersResponse},
    repo_types::AccountStatus,
    services,
};
use crate::{
    auth::extractors::{AdminUser, AuthUser, MaybeAuthUser},
    error::ApiResult,
    extract::ValidJson,
    response::{self, Reply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/profile", put(update_profile))
        .route("/users/:id", get(get_user))
        .route("/users/:id/ban", put(ban_user))
        .route("/users/:id/unban", put(unban_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ApiResult<Reply<UsersResponse>> {
    let users = services::list_public(&state, query.skill()).await?;
    Ok(response::data(UsersResponse {
        users: users.into_iter().map(AccountView::from).collect(),
    }))
}

#[instrument(skip(state, viewer))]
pub async fn get_user(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reply<UserResponse>> {
    let account = services::get_visible(&state, id, viewer).await?;
    Ok(response::data(UserResponse {
        user: account.into(),
    }))
}

#[instrument(skip(state, session, payload), fields(account_id = %session.account_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Reply<UserResponse>> {
    let account = services::update_profile(&state, session.account_id, payload.into()).await?;
    Ok(response::ok(
        "Profile updated successfully",
        UserResponse {
            user: account.into(),
        },
    ))
}

#[instrument(skip(state, admin))]
pub async fn ban_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reply<UserResponse>> {
    let account = services::set_status(&state, admin, id, AccountStatus::Banned).await?;
    Ok(response::ok(
        "User has been banned",
        UserResponse {
            user: account.into(),
        },
    ))
}

#[instrument(skip(state, admin))]
pub async fn unban_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reply<UserResponse>> {
    let account = services::set_status(&state, admin, id, AccountStatus::Active).await?;
    Ok(response::ok(
        "User has been unbanned",
        UserResponse {
            user: account.into(),
        },
    ))
}
