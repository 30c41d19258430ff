//! Identity & credential lifecycle: signup, OTP verification, login and
//! password reset.

use axum::extract::FromRef;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use super::{
    jwt::JwtKeys,
    password::{burn_verification, hash_password, verify_password},
    tokens::{constant_time_eq, digest_reset_secret, generate_otp, generate_reset_secret},
};
use crate::{
    accounts::repo_types::{Account, NewAccount},
    error::{ApiError, ApiResult},
    mail::templates,
    state::AppState,
};

/// Completing a password reset also marks the account verified: the reset
/// link was delivered to the address, which proves ownership as an OTP does.
pub const VERIFY_ON_RESET: bool = true;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_OTP: &str = "Invalid or expired OTP";
pub const INVALID_RESET_TOKEN: &str = "Password reset token is invalid or has expired";

/// Creates an unverified account and mails its OTP. Returns the email to verify.
pub async fn register(
    state: &AppState,
    name: String,
    email: String,
    password: &str,
) -> ApiResult<String> {
    if state.accounts.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("User with this email already exists".into()));
    }

    let password_hash = hash_password(password)?;
    let otp = generate_otp();
    let ttl = state.config.otp_ttl_minutes;
    let account = state
        .accounts
        .create(NewAccount {
            name,
            email,
            password_hash,
            profile_photo: Some(state.config.default_profile_photo.clone()),
            otp: otp.clone(),
            otp_expires: OffsetDateTime::now_utc() + Duration::minutes(ttl),
        })
        .await?
        .ok_or_else(|| ApiError::Conflict("User with this email already exists".into()))?;

    if !state
        .notifier
        .deliver(templates::signup_otp(&account.email, &otp, ttl))
        .await
    {
        warn!(account_id = %account.id, "signup OTP not delivered; account kept unverified");
    }

    info!(account_id = %account.id, email = %account.email, "account registered");
    Ok(account.email)
}

/// Proves email ownership and issues a session.
pub async fn verify_otp(state: &AppState, email: &str, otp: &str) -> ApiResult<(String, Account)> {
    let mut account = state
        .accounts
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if account.is_verified {
        return Err(ApiError::InvalidState("Email already verified".into()));
    }

    let now = OffsetDateTime::now_utc();
    let matches = account
        .otp
        .as_deref()
        .is_some_and(|stored| constant_time_eq(stored, otp));
    let live = account.otp_expires.is_some_and(|exp| exp > now);
    if !(matches && live) {
        warn!(account_id = %account.id, expired = !live, "OTP rejected");
        return Err(ApiError::InvalidCredential(INVALID_OTP.into()));
    }

    state.accounts.mark_verified(account.id).await?;
    account.is_verified = true;
    account.otp = None;
    account.otp_expires = None;

    let token = JwtKeys::from_ref(state).sign(account.id, account.role)?;
    info!(account_id = %account.id, "email verified");
    Ok((token, account))
}

/// Regenerates and re-sends the OTP. Unknown emails succeed silently.
pub async fn resend_otp(state: &AppState, email: &str) -> ApiResult<()> {
    let Some(account) = state.accounts.find_by_email(email).await? else {
        debug!("send-otp for unknown email");
        return Ok(());
    };
    if account.is_verified {
        return Err(ApiError::InvalidState("Email already verified. Please login.".into()));
    }

    let otp = generate_otp();
    let ttl = state.config.otp_ttl_minutes;
    state
        .accounts
        .set_otp(account.id, &otp, OffsetDateTime::now_utc() + Duration::minutes(ttl))
        .await?;
    state
        .notifier
        .spawn(templates::resend_otp(&account.email, &otp, ttl));
    info!(account_id = %account.id, "OTP regenerated");
    Ok(())
}

pub async fn login(state: &AppState, email: &str, password: &str) -> ApiResult<(String, Account)> {
    let Some(account) = state.accounts.find_by_email(email).await? else {
        burn_verification(password);
        warn!("login for unknown email");
        return Err(ApiError::InvalidCredential(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(password, &account.password_hash)? {
        warn!(account_id = %account.id, "login with wrong password");
        return Err(ApiError::InvalidCredential(INVALID_CREDENTIALS.into()));
    }
    if !account.is_verified {
        return Err(ApiError::forbidden("Please verify your email address first"));
    }
    if account.is_banned() {
        warn!(account_id = %account.id, "banned account tried to log in");
        return Err(ApiError::forbidden("This account has been banned"));
    }

    let token = JwtKeys::from_ref(state).sign(account.id, account.role)?;
    info!(account_id = %account.id, "logged in");
    Ok((token, account))
}

/// Stores the digest of a fresh reset secret and mails the secret.
///
/// Unknown emails succeed silently. If the mail cannot be delivered the
/// stored token is cleared again and the caller gets an error.
pub async fn request_password_reset(state: &AppState, email: &str) -> ApiResult<()> {
    let Some(account) = state.accounts.find_by_email(email).await? else {
        debug!("forgot-password for unknown email");
        return Ok(());
    };

    let secret = generate_reset_secret();
    let expires = OffsetDateTime::now_utc() + Duration::minutes(state.config.reset_ttl_minutes);
    state
        .accounts
        .set_reset_token(account.id, Some((&digest_reset_secret(&secret), expires)))
        .await?;

    let reset_url = format!(
        "{}/reset-password/{}",
        state.config.public_base_url.trim_end_matches('/'),
        secret
    );
    if !state
        .notifier
        .deliver(templates::password_reset(&account.email, &reset_url))
        .await
    {
        state.accounts.set_reset_token(account.id, None).await?;
        return Err(ApiError::Delivery(
            "Failed to send password reset email. Please try again later.".into(),
        ));
    }

    info!(account_id = %account.id, "password reset requested");
    Ok(())
}

pub async fn complete_password_reset(
    state: &AppState,
    secret: &str,
    new_password: &str,
) -> ApiResult<()> {
    let password_hash = hash_password(new_password)?;
    let account = state
        .accounts
        .complete_reset(
            &digest_reset_secret(secret),
            OffsetDateTime::now_utc(),
            &password_hash,
            VERIFY_ON_RESET,
        )
        .await?
        .ok_or_else(|| {
            warn!("reset attempted with unknown or expired token");
            ApiError::InvalidCredential(INVALID_RESET_TOKEN.into())
        })?;
    info!(account_id = %account.id, "password reset completed");
    Ok(())
}

pub async fn current_account(state: &AppState, account_id: uuid::Uuid) -> ApiResult<Account> {
    state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}
