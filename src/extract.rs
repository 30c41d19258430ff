use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Per-request schema check run after deserialization.
///
/// Implementations normalise fields in place (trim, lowercase) and reject
/// missing or malformed values before business logic sees them.
pub trait Validate {
    fn validate(&mut self) -> Result<(), ApiError>;
}

/// JSON body extractor that renders rejections in the API envelope and runs
/// [`Validate`].
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::InvalidArgument(e.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases `email`, then checks its shape.
pub(crate) fn normalize_email(email: &mut String) -> Result<(), ApiError> {
    *email = email.trim().to_lowercase();
    if !is_valid_email(email) {
        return Err(ApiError::invalid("Valid email is required"));
    }
    Ok(())
}

pub(crate) fn require_non_blank(value: &mut String, msg: &str) -> Result<(), ApiError> {
    *value = value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::invalid(msg));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let mut e = "  Alice@Example.COM ".to_string();
        normalize_email(&mut e).unwrap();
        assert_eq!(e, "alice@example.com");

        let mut bad = "nope".to_string();
        assert!(matches!(
            normalize_email(&mut bad),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn blank_values_are_rejected() {
        let mut v = "   ".to_string();
        assert!(require_non_blank(&mut v, "Name is required").is_err());
        let mut v = " Bob ".to_string();
        require_non_blank(&mut v, "Name is required").unwrap();
        assert_eq!(v, "Bob");
    }
}
