use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::repo_types::UnknownVariant;

/// Lifecycle of a swap request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SwapStatus {
    pub const ALL: [SwapStatus; 4] = [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Rejected,
        SwapStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != SwapStatus::Pending
    }
}

impl TryFrom<&str> for SwapStatus {
    type Error = UnknownVariant;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        SwapStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("swap status", s))
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub id: Uuid,
    pub sender: Uuid,
    pub recipient: Uuid,
    pub skills_involved: Vec<String>,
    pub message: String,
    pub status: SwapStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SwapRequest {
    pub fn is_party(&self, account_id: Uuid) -> bool {
        self.sender == account_id || self.recipient == account_id
    }

    /// The other party from `account_id`'s point of view.
    pub fn counterpart(&self, account_id: Uuid) -> Uuid {
        if self.sender == account_id {
            self.recipient
        } else {
            self.sender
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSwapRequest {
    pub sender: Uuid,
    pub recipient: Uuid,
    pub skills_involved: Vec<String>,
    pub message: String,
}

#[derive(Debug, FromRow)]
pub struct SwapRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub skills_involved: Vec<String>,
    pub message: String,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<SwapRequestRow> for SwapRequest {
    type Error = UnknownVariant;

    fn try_from(r: SwapRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: SwapStatus::try_from(r.status.as_str())?,
            id: r.id,
            sender: r.sender_id,
            recipient: r.recipient_id,
            skills_involved: r.skills_involved,
            message: r.message,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}
