use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{SwapRequest, SwapStatus};
use crate::{
    accounts::repo_types::Account,
    error::ApiError,
    extract::{require_non_blank, Validate},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSwapRequest {
    pub recipient_id: Uuid,
    pub skills_involved: Vec<String>,
    pub message: String,
}

impl Validate for CreateSwapRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        self.skills_involved = std::mem::take(&mut self.skills_involved)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.skills_involved.is_empty() {
            return Err(ApiError::invalid("At least one skill must be involved"));
        }
        require_non_blank(&mut self.message, "Message is required")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl UpdateStatusRequest {
    /// Target status; only terminal states can be requested.
    pub fn target(&self) -> Result<SwapStatus, ApiError> {
        match SwapStatus::try_from(self.status.as_str()) {
            Ok(s) if s.is_terminal() => Ok(s),
            _ => Err(ApiError::invalid(
                "Status must be one of: accepted, rejected, cancelled",
            )),
        }
    }
}

impl Validate for UpdateStatusRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        self.status = self.status.trim().to_lowercase();
        self.target().map(|_| ())
    }
}

/// Public display fields of a party to a request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_photo: Option<String>,
}

impl From<&Account> for PartySummary {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            email: a.email.clone(),
            profile_photo: a.profile_photo.clone(),
        }
    }
}

/// A swap request with both parties resolved. A party whose account no
/// longer exists is rendered as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapView {
    pub id: Uuid,
    pub sender: Option<PartySummary>,
    pub recipient: Option<PartySummary>,
    pub skills_involved: Vec<String>,
    pub message: String,
    pub status: SwapStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl SwapView {
    pub fn new(
        swap: SwapRequest,
        sender: Option<PartySummary>,
        recipient: Option<PartySummary>,
    ) -> Self {
        Self {
            id: swap.id,
            sender,
            recipient,
            skills_involved: swap.skills_involved,
            message: swap.message,
            status: swap.status,
            created_at: swap.created_at,
            updated_at: swap.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub swap_request: SwapView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapsResponse {
    pub swap_requests: Vec<SwapView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_skills_and_message() {
        let id = Uuid::new_v4();
        let mut req: CreateSwapRequest = serde_json::from_str(&format!(
            r#"{{"recipientId":"{id}","skillsInvolved":[" React ",""],"message":" hi "}}"#
        ))
        .unwrap();
        req.validate().unwrap();
        assert_eq!(req.skills_involved, vec!["React".to_string()]);
        assert_eq!(req.message, "hi");

        let mut empty = CreateSwapRequest {
            recipient_id: id,
            skills_involved: vec!["  ".into()],
            message: "hi".into(),
        };
        assert!(empty.validate().is_err());

        let mut silent = CreateSwapRequest {
            recipient_id: id,
            skills_involved: vec!["Go".into()],
            message: "   ".into(),
        };
        assert!(silent.validate().is_err());
    }

    #[test]
    fn recipient_id_must_be_uuid() {
        assert!(serde_json::from_str::<CreateSwapRequest>(
            r#"{"recipientId":"bob","skillsInvolved":["Go"],"message":"hi"}"#
        )
        .is_err());
    }

    #[test]
    fn only_terminal_targets_accepted() {
        for (raw, ok) in [
            ("accepted", true),
            ("Rejected", true),
            (" cancelled ", true),
            ("pending", false),
            ("archived", false),
        ] {
            let mut req = UpdateStatusRequest { status: raw.into() };
            assert_eq!(req.validate().is_ok(), ok, "{raw}");
        }
    }
}
