use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{password::MIN_PASSWORD_LEN, tokens::is_otp_shape};
use crate::{
    accounts::repo_types::{Account, Role},
    error::ApiError,
    extract::{normalize_email, require_non_blank, Validate},
};

fn check_password(p: &str, field: &str) -> Result<(), ApiError> {
    if p.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::invalid(format!(
            "{field} must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Request body for signup.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for SignupRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        require_non_blank(&mut self.name, "Name is required")?;
        normalize_email(&mut self.email)?;
        check_password(&self.password, "Password")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl Validate for VerifyOtpRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        normalize_email(&mut self.email)?;
        self.otp = self.otp.trim().to_string();
        if !is_otp_shape(&self.otp) {
            return Err(ApiError::invalid("OTP must be 6 digits"));
        }
        Ok(())
    }
}

/// Body carrying only an email (send-otp, forgot-password).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        normalize_email(&mut self.email)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        normalize_email(&mut self.email)?;
        if self.password.is_empty() {
            return Err(ApiError::invalid("Password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        require_non_blank(&mut self.token, "Token is required")?;
        check_password(&self.new_password, "New password")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub email_for_verification: String,
}

/// Account summary returned alongside a fresh session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub profile_photo: Option<String>,
}

impl From<Account> for SessionUser {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            role: a.role,
            is_verified: a.is_verified,
            profile_photo: a.profile_photo,
        }
    }
}

/// Response returned after OTP verification or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_normalizes_and_checks_fields() {
        let mut req: SignupRequest = serde_json::from_str(
            r#"{"name":" Alice ","email":" Alice@Example.com","password":"secret1"}"#,
        )
        .unwrap();
        req.validate().unwrap();
        assert_eq!(req.name, "Alice");
        assert_eq!(req.email, "alice@example.com");

        let mut short: SignupRequest =
            serde_json::from_str(r#"{"name":"A","email":"a@example.com","password":"12345"}"#)
                .unwrap();
        assert!(matches!(short.validate(), Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn missing_or_unknown_fields_do_not_deserialize() {
        assert!(serde_json::from_str::<SignupRequest>(r#"{"email":"a@example.com"}"#).is_err());
        assert!(serde_json::from_str::<LoginRequest>(
            r#"{"email":"a@example.com","password":"x","role":"admin"}"#
        )
        .is_err());
    }

    #[test]
    fn otp_must_be_six_digits() {
        let mut req = VerifyOtpRequest {
            email: "a@example.com".into(),
            otp: "12345".into(),
        };
        assert!(req.validate().is_err());
        req.otp = " 123456 ".into();
        req.validate().unwrap();
        assert_eq!(req.otp, "123456");
    }

    #[test]
    fn reset_request_uses_camel_case() {
        let mut req: ResetPasswordRequest =
            serde_json::from_str(r#"{"token":"abc","newPassword":"longenough"}"#).unwrap();
        req.validate().unwrap();
        assert_eq!(req.new_password, "longenough");
    }
}
