use anyhow::Context;
use serde::Deserialize;

use crate::mail::SmtpConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Which persistence collaborator backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub otp_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
    pub public_base_url: String,
    pub default_profile_photo: String,
    #[serde(skip)]
    pub smtp: Option<SmtpConfig>,
}

pub const DEFAULT_PROFILE_PHOTO: &str =
    "https://res.cloudinary.com/demo/image/upload/w_100,h_100,c_fill,g_auto/sample.jpg";

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("unknown STORE_BACKEND {other:?} (expected postgres or memory)"),
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => {
                Some(std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?)
            }
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "skillswap".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "skillswap-users".into()),
            ttl_minutes: env_i64("JWT_TTL_MINUTES", 60),
        };

        Ok(Self {
            store_backend,
            database_url,
            jwt,
            otp_ttl_minutes: env_i64("OTP_TTL_MINUTES", 10),
            reset_ttl_minutes: env_i64("RESET_TTL_MINUTES", 60),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            default_profile_photo: std::env::var("DEFAULT_PROFILE_PHOTO")
                .unwrap_or_else(|_| DEFAULT_PROFILE_PHOTO.into()),
            smtp: SmtpConfig::from_env(),
        })
    }

    /// Configuration used by tests and `AppState::fake`.
    pub fn for_tests() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            otp_ttl_minutes: 10,
            reset_ttl_minutes: 60,
            public_base_url: "http://localhost:8080".into(),
            default_profile_photo: DEFAULT_PROFILE_PHOTO.into(),
            smtp: None,
        }
    }
}
