use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    accounts::repo_types::Account,
    error::ApiError,
    extract::{require_non_blank, Validate},
    swaps::repo_types::SwapStatus,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastRequest {
    pub message: String,
}

impl Validate for BroadcastRequest {
    fn validate(&mut self) -> Result<(), ApiError> {
        require_non_blank(&mut self.message, "Message content is required.")
    }
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub recipients: usize,
}

/// Supported report exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    UserActivity,
    SwapStats,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::UserActivity => "user_activity",
            ReportKind::SwapStats => "swap_stats",
        }
    }

    pub fn filename(self) -> String {
        format!("{}_report.json", self.as_str())
    }
}

impl std::str::FromStr for ReportKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_activity" => Ok(ReportKind::UserActivity),
            "swap_stats" => Ok(ReportKind::SwapStats),
            _ => Err(ApiError::invalid("Invalid report type.")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityRow {
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Account> for UserActivityRow {
    fn from(a: Account) -> Self {
        Self {
            name: a.name,
            email: a.email,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SwapStatRow {
    pub status: SwapStatus,
    pub count: i64,
}
