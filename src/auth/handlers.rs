use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{
        AuthResponse, EmailRequest, LoginRequest, ResetPasswordRequest, SessionUser,
        SignupRequest, SignupResponse, VerifyOtpRequest,
    },
    extractors::AuthUser,
    services,
};
use crate::{
    accounts::dto::{AccountView, UserResponse},
    error::ApiResult,
    extract::ValidJson,
    response::{self, Empty, Reply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignupRequest>,
) -> ApiResult<Reply<SignupResponse>> {
    let email =
        services::register(&state, payload.name, payload.email, &payload.password).await?;
    Ok(response::created(
        "Registration successful. Please check your email for the OTP to verify your account.",
        SignupResponse {
            email_for_verification: email,
        },
    ))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<VerifyOtpRequest>,
) -> ApiResult<Reply<AuthResponse>> {
    let (token, account) = services::verify_otp(&state, &payload.email, &payload.otp).await?;
    Ok(response::ok(
        "Email verified successfully. You are now logged in.",
        AuthResponse {
            token,
            user: SessionUser::from(account),
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn send_otp(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<EmailRequest>,
) -> ApiResult<Reply<Empty>> {
    services::resend_otp(&state, &payload.email).await?;
    Ok(response::message(
        "If an unverified account exists for this email, a new OTP has been sent.",
    ))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> ApiResult<Reply<AuthResponse>> {
    let (token, account) = services::login(&state, &payload.email, &payload.password).await?;
    Ok(response::ok(
        "Logged in successfully",
        AuthResponse {
            token,
            user: SessionUser::from(account),
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<EmailRequest>,
) -> ApiResult<Reply<Empty>> {
    services::request_password_reset(&state, &payload.email).await?;
    Ok(response::message(
        "If an account with that email exists, a password reset link has been sent.",
    ))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Reply<Empty>> {
    services::complete_password_reset(&state, &payload.token, &payload.new_password).await?;
    Ok(response::message(
        "Password has been reset successfully. You can now log in with your new password.",
    ))
}

#[instrument(skip(state, session), fields(account_id = %session.account_id))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> ApiResult<Reply<UserResponse>> {
    let account = services::current_account(&state, session.account_id).await?;
    Ok(response::data(UserResponse {
        user: AccountView::from(account),
    }))
}
