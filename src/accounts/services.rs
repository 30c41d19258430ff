use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Account, AccountStatus, ProfileChanges, Role};
use crate::{
    auth::claims::Session,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Trims entries, drops blanks and removes case-insensitive duplicates,
/// keeping the first spelling.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// Discoverable accounts, narrowed to those offering `skill` when given.
pub async fn list_public(state: &AppState, skill: Option<&str>) -> ApiResult<Vec<Account>> {
    Ok(state.accounts.list_public(skill).await?)
}

/// One account as seen by `viewer`. Private and banned accounts are hidden
/// from everyone except the owner and admins.
pub async fn get_visible(
    state: &AppState,
    id: Uuid,
    viewer: Option<Session>,
) -> ApiResult<Account> {
    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let privileged = viewer.is_some_and(|s| s.account_id == id || s.role == Role::Admin);
    if !(account.is_discoverable() || privileged) {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(account)
}

pub async fn update_profile(
    state: &AppState,
    account_id: Uuid,
    mut changes: ProfileChanges,
) -> ApiResult<Account> {
    changes.skills_offered = changes.skills_offered.map(normalize_skills);
    changes.skills_wanted = changes.skills_wanted.map(normalize_skills);

    let account = state
        .accounts
        .update_profile(account_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(%account_id, "profile updated");
    Ok(account)
}

pub async fn set_status(
    state: &AppState,
    admin: Session,
    target: Uuid,
    status: AccountStatus,
) -> ApiResult<Account> {
    let account = state
        .accounts
        .find_by_id(target)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if status == AccountStatus::Banned && account.role == Role::Admin {
        warn!(admin_id = %admin.account_id, %target, "attempt to ban an admin");
        return Err(ApiError::forbidden("Admin accounts cannot be banned"));
    }

    let account = state
        .accounts
        .set_status(target, status)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(admin_id = %admin.account_id, %target, status = status.as_str(), "account status changed");
    Ok(account)
}
