use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Banned,
}

#[derive(Debug, Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = UnknownVariant;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Banned => "banned",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = UnknownVariant;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "banned" => Ok(AccountStatus::Banned),
            _ => Err(UnknownVariant::new("account status", s)),
        }
    }
}

/// Account record as held by the persistence collaborator.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,                    // trimmed, lowercase, unique
    pub password_hash: String,            // Argon2 PHC string
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Option<String>,
    pub is_public: bool,
    pub role: Role,
    pub status: AccountStatus,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expires: Option<OffsetDateTime>,
    pub password_reset_token: Option<String>, // sha256 hex of the mailed secret
    pub password_reset_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Account {
    pub fn is_banned(&self) -> bool {
        self.status == AccountStatus::Banned
    }

    /// Visible to other users through browse and as a swap recipient.
    pub fn is_discoverable(&self) -> bool {
        self.is_public && !self.is_banned()
    }
}

/// Fields supplied on signup.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_photo: Option<String>,
    pub otp: String,
    pub otp_expires: OffsetDateTime,
}

/// Self-service profile changes; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl ProfileChanges {
    pub fn apply(self, account: &mut Account) {
        if let Some(v) = self.name {
            account.name = v;
        }
        if let Some(v) = self.location {
            account.location = Some(v);
        }
        if let Some(v) = self.profile_photo {
            account.profile_photo = Some(v);
        }
        if let Some(v) = self.availability {
            account.availability = Some(v);
        }
        if let Some(v) = self.skills_offered {
            account.skills_offered = v;
        }
        if let Some(v) = self.skills_wanted {
            account.skills_wanted = v;
        }
        if let Some(v) = self.is_public {
            account.is_public = v;
        }
    }
}

/// Row shape of the `accounts` table.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Option<String>,
    pub is_public: bool,
    pub role: String,
    pub status: String,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expires: Option<OffsetDateTime>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<AccountRow> for Account {
    type Error = UnknownVariant;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::try_from(r.role.as_str())?,
            status: AccountStatus::try_from(r.status.as_str())?,
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            profile_photo: r.profile_photo,
            location: r.location,
            skills_offered: r.skills_offered,
            skills_wanted: r.skills_wanted,
            availability: r.availability,
            is_public: r.is_public,
            is_verified: r.is_verified,
            otp: r.otp,
            otp_expires: r.otp_expires,
            password_reset_token: r.password_reset_token,
            password_reset_expires: r.password_reset_expires,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
