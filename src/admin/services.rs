use tracing::info;

use super::dto::{ReportKind, SwapStatRow, UserActivityRow};
use crate::{
    auth::claims::Session,
    error::ApiResult,
    mail::templates,
    state::AppState,
};

/// Queues `message` to every verified, active account. Returns how many
/// mails were queued; delivery happens in the background.
pub async fn broadcast(state: &AppState, admin: Session, message: &str) -> ApiResult<usize> {
    let recipients = state.accounts.list_verified().await?;
    for account in &recipients {
        state
            .notifier
            .spawn(templates::broadcast(&account.email, message));
    }
    info!(admin_id = %admin.account_id, recipients = recipients.len(), "platform message queued");
    Ok(recipients.len())
}

/// Renders a report as a pretty-printed JSON array.
pub async fn report(state: &AppState, kind: ReportKind) -> ApiResult<String> {
    let body = match kind {
        ReportKind::UserActivity => {
            let rows: Vec<UserActivityRow> = state
                .accounts
                .list_all()
                .await?
                .into_iter()
                .map(UserActivityRow::from)
                .collect();
            serde_json::to_string_pretty(&rows)
        }
        ReportKind::SwapStats => {
            let rows: Vec<SwapStatRow> = state
                .swaps
                .count_by_status()
                .await?
                .into_iter()
                .map(|(status, count)| SwapStatRow { status, count })
                .collect();
            serde_json::to_string_pretty(&rows)
        }
    }
    .map_err(anyhow::Error::from)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::accounts::repo_types::Role;
    use crate::auth::services::{register, test_support::*, verify_otp};
    use crate::swaps::services as swaps;

    #[tokio::test]
    async fn broadcast_reaches_verified_accounts_only() {
        let mailer = Arc::new(CapturingMailer::default());
        let (state, _) = state_with(mailer.clone());
        register(&state, "A".into(), "a@example.com".into(), "secret1").await.unwrap();
        let (_, a) = verify_otp(&state, "a@example.com", &otp_for(&mailer, "a@example.com"))
            .await
            .unwrap();
        register(&state, "B".into(), "b@example.com".into(), "secret1").await.unwrap();

        let admin = Session { account_id: a.id, role: Role::Admin };
        let n = broadcast(&state, admin, "Maintenance tonight").await.unwrap();
        assert_eq!(n, 1);
        let mail = wait_for_mail(&mailer, "a@example.com", "Skill Swap: Platform Update").await;
        assert_eq!(mail.text, "Maintenance tonight");
    }

    #[tokio::test]
    async fn reports_render_json_arrays() {
        let mailer = Arc::new(CapturingMailer::default());
        let (state, _) = state_with(mailer.clone());
        let mut ids = Vec::new();
        for email in ["a@example.com", "b@example.com"] {
            register(&state, "U".into(), email.into(), "secret1").await.unwrap();
            let (_, acc) = verify_otp(&state, email, &otp_for(&mailer, email)).await.unwrap();
            ids.push(acc.id);
        }
        swaps::create(&state, ids[0], ids[1], vec!["Go".into()], "hi".into())
            .await
            .unwrap();

        let users: serde_json::Value =
            serde_json::from_str(&report(&state, ReportKind::UserActivity).await.unwrap()).unwrap();
        assert_eq!(users.as_array().map(Vec::len), Some(2));
        assert!(users[0].get("createdAt").is_some());
        assert!(users[0].get("passwordHash").is_none());

        let stats: serde_json::Value =
            serde_json::from_str(&report(&state, ReportKind::SwapStats).await.unwrap()).unwrap();
        assert_eq!(stats, serde_json::json!([{ "status": "pending", "count": 1 }]));
    }

    #[test]
    fn unknown_report_kind_is_invalid() {
        assert!("feedback_logs".parse::<ReportKind>().is_err());
        assert_eq!(
            "swap_stats".parse::<ReportKind>().unwrap().filename(),
            "swap_stats_report.json"
        );
    }
}
