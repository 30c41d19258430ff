use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Account, AccountStatus, ProfileChanges, Role};
use crate::{error::ApiError, extract::Validate};

/// Account as returned to clients: no password hash, OTP or reset fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Option<String>,
    pub is_public: bool,
    pub role: Role,
    pub status: AccountStatus,
    pub is_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            profile_photo: a.profile_photo,
            location: a.location,
            skills_offered: a.skills_offered,
            skills_wanted: a.skills_wanted,
            availability: a.availability,
            is_public: a.is_public,
            role: a.role,
            status: a.status,
            is_verified: a.is_verified,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: AccountView,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<AccountView>,
}

/// `GET /users?skill=React`
#[derive(Debug, Deserialize, Default)]
pub struct BrowseQuery {
    pub skill: Option<String>,
}

impl BrowseQuery {
    /// The trimmed skill filter; blank means no filter.
    pub fn skill(&self) -> Option<&str> {
        self.skill.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        if let Some(name) = self.name.as_mut() {
            crate::extract::require_non_blank(name, "Name cannot be empty")?;
        }
        if let Some(photo) = self.profile_photo.as_mut() {
            *photo = photo.trim().to_string();
            if !(photo.starts_with("https://") || photo.starts_with("http://")) {
                return Err(ApiError::invalid("Profile photo must be an http(s) URL"));
            }
        }
        for field in [self.location.as_mut(), self.availability.as_mut()]
            .into_iter()
            .flatten()
        {
            *field = field.trim().to_string();
        }
        Ok(())
    }
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
            profile_photo: r.profile_photo,
            availability: r.availability,
            skills_offered: r.skills_offered,
            skills_wanted: r.skills_wanted,
            is_public: r.is_public,
        }
    }
}
