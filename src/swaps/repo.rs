use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewSwapRequest, StatusCountRow, SwapRequest, SwapRequestRow, SwapStatus};

/// Durable storage for swap requests.
#[async_trait]
pub trait SwapRepo: Send + Sync {
    async fn create(&self, new: NewSwapRequest) -> anyhow::Result<SwapRequest>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SwapRequest>>;

    /// Newest first.
    async fn list_by_sender(&self, sender: Uuid) -> anyhow::Result<Vec<SwapRequest>>;

    /// Newest first.
    async fn list_by_recipient(&self, recipient: Uuid) -> anyhow::Result<Vec<SwapRequest>>;

    /// Atomically moves a `pending` request to `status`.
    ///
    /// Returns `None` when the request is missing or no longer pending.
    async fn transition_if_pending(
        &self,
        id: Uuid,
        status: SwapStatus,
    ) -> anyhow::Result<Option<SwapRequest>>;

    /// Returns `false` if nothing was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn count_by_status(&self) -> anyhow::Result<Vec<(SwapStatus, i64)>>;
}

const SWAP_COLUMNS: &str = r#"
    id, sender_id, recipient_id, skills_involved, message, status, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgSwapRepo {
    db: PgPool,
}

impl PgSwapRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn many(rows: Vec<SwapRequestRow>) -> anyhow::Result<Vec<SwapRequest>> {
    Ok(rows
        .into_iter()
        .map(SwapRequest::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl SwapRepo for PgSwapRepo {
    async fn create(&self, new: NewSwapRequest) -> anyhow::Result<SwapRequest> {
        let row = sqlx::query_as::<_, SwapRequestRow>(&format!(
            r#"
            INSERT INTO swap_requests (id, sender_id, recipient_id, skills_involved, message, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.sender)
        .bind(new.recipient)
        .bind(&new.skills_involved)
        .bind(&new.message)
        .fetch_one(&self.db)
        .await
        .context("insert swap request")?;
        Ok(SwapRequest::try_from(row)?)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(&format!(
            "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find swap request")?;
        Ok(row.map(SwapRequest::try_from).transpose()?)
    }

    async fn list_by_sender(&self, sender: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        let rows = sqlx::query_as::<_, SwapRequestRow>(&format!(
            r#"
            SELECT {SWAP_COLUMNS}
              FROM swap_requests
             WHERE sender_id = $1
             ORDER BY created_at DESC
            "#
        ))
        .bind(sender)
        .fetch_all(&self.db)
        .await
        .context("list sent swap requests")?;
        many(rows)
    }

    async fn list_by_recipient(&self, recipient: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        let rows = sqlx::query_as::<_, SwapRequestRow>(&format!(
            r#"
            SELECT {SWAP_COLUMNS}
              FROM swap_requests
             WHERE recipient_id = $1
             ORDER BY created_at DESC
            "#
        ))
        .bind(recipient)
        .fetch_all(&self.db)
        .await
        .context("list received swap requests")?;
        many(rows)
    }

    async fn transition_if_pending(
        &self,
        id: Uuid,
        status: SwapStatus,
    ) -> anyhow::Result<Option<SwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(&format!(
            r#"
            UPDATE swap_requests
               SET status = $2, updated_at = now()
             WHERE id = $1 AND status = 'pending'
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("transition swap request")?;
        Ok(row.map(SwapRequest::try_from).transpose()?)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM swap_requests WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete swap request")?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> anyhow::Result<Vec<(SwapStatus, i64)>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT status, COUNT(*) AS count
              FROM swap_requests
             GROUP BY status
             ORDER BY status
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("count swap requests by status")?;
        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push((SwapStatus::try_from(r.status.as_str())?, r.count));
        }
        Ok(out)
    }
}
