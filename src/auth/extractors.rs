use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{debug, warn};

use super::{claims::Session, jwt::JwtKeys};
use crate::{accounts::repo_types::Role, error::ApiError};

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Access denied: malformed authorization header".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized("Access denied: malformed authorization header".into())
        })?;
    Ok(Some(token))
}

/// Requires a valid bearer credential.
pub struct AuthUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::Unauthorized("Access denied: no token provided".into()))?;
        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "rejected session token");
            e
        })?;
        Ok(AuthUser(claims.into()))
    }
}

/// Accepts requests with or without a credential; invalid credentials are
/// treated as anonymous.
pub struct MaybeAuthUser(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(Some(token)) = bearer_token(parts) else {
            return Ok(MaybeAuthUser(None));
        };
        match JwtKeys::from_ref(state).verify(token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(claims.into()))),
            Err(e) => {
                debug!(error = %e, "ignoring unusable optional credential");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

/// Valid bearer credential carrying the admin role.
pub struct AdminUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(session) = AuthUser::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            warn!(account_id = %session.account_id, "non-admin hit admin route");
            return Err(ApiError::forbidden(
                "Access denied: you do not have the required permissions",
            ));
        }
        Ok(AdminUser(session))
    }
}
