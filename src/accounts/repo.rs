use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Account, AccountRow, AccountStatus, NewAccount, ProfileChanges};

/// Durable storage for accounts.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Inserts an unverified account. Returns `None` if the email is taken.
    async fn create(&self, new: NewAccount) -> anyhow::Result<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Account>>;

    async fn set_otp(&self, id: Uuid, otp: &str, expires: OffsetDateTime) -> anyhow::Result<()>;

    /// Sets `is_verified` and clears the OTP fields.
    async fn mark_verified(&self, id: Uuid) -> anyhow::Result<()>;

    /// Stores or (with `None`) clears the reset digest and expiry.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, OffsetDateTime)>,
    ) -> anyhow::Result<()>;

    /// Replaces the password hash and clears the reset fields on the account
    /// whose stored digest matches and has not expired at `now`. The match and
    /// the write are one step, so a secret is consumed at most once.
    async fn complete_reset(
        &self,
        digest: &str,
        now: OffsetDateTime,
        password_hash: &str,
        mark_verified: bool,
    ) -> anyhow::Result<Option<Account>>;

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> anyhow::Result<Option<Account>>;

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> anyhow::Result<Option<Account>>;

    /// Public, non-banned accounts ordered by creation time, optionally only
    /// those offering `skill` (case-insensitive).
    async fn list_public(&self, skill: Option<&str>) -> anyhow::Result<Vec<Account>>;

    async fn list_all(&self) -> anyhow::Result<Vec<Account>>;

    /// Verified, non-banned accounts (broadcast recipients).
    async fn list_verified(&self) -> anyhow::Result<Vec<Account>>;
}

const ACCOUNT_COLUMNS: &str = r#"
    id, name, email, password_hash, profile_photo, location,
    skills_offered, skills_wanted, availability, is_public, role, status,
    is_verified, otp, otp_expires, password_reset_token, password_reset_expires,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgAccountRepo {
    db: PgPool,
}

impl PgAccountRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn one(row: Option<AccountRow>) -> anyhow::Result<Option<Account>> {
    Ok(row.map(Account::try_from).transpose()?)
}

fn many(rows: Vec<AccountRow>) -> anyhow::Result<Vec<Account>> {
    Ok(rows
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl AccountRepo for PgAccountRepo {
    async fn create(&self, new: NewAccount) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, profile_photo, otp, otp_expires)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO NOTHING
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.profile_photo)
        .bind(&new.otp)
        .bind(new.otp_expires)
        .fetch_optional(&self.db)
        .await
        .context("insert account")?;
        one(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find account by id")?;
        one(row)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find account by email")?;
        one(row)
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("find accounts by ids")?;
        many(rows)
    }

    async fn set_otp(&self, id: Uuid, otp: &str, expires: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
               SET otp = $2, otp_expires = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(otp)
        .bind(expires)
        .execute(&self.db)
        .await
        .context("set otp")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
               SET is_verified = TRUE, otp = NULL, otp_expires = NULL, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .context("mark account verified")?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, OffsetDateTime)>,
    ) -> anyhow::Result<()> {
        let (digest, expires) = match token {
            Some((d, e)) => (Some(d), Some(e)),
            None => (None, None),
        };
        sqlx::query(
            r#"
            UPDATE accounts
               SET password_reset_token = $2, password_reset_expires = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(digest)
        .bind(expires)
        .execute(&self.db)
        .await
        .context("set reset token")?;
        Ok(())
    }

    async fn complete_reset(
        &self,
        digest: &str,
        now: OffsetDateTime,
        password_hash: &str,
        mark_verified: bool,
    ) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts
               SET password_hash = $3,
                   password_reset_token = NULL,
                   password_reset_expires = NULL,
                   is_verified = is_verified OR $4,
                   updated_at = now()
             WHERE password_reset_token = $1
               AND password_reset_expires > $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(digest)
        .bind(now)
        .bind(password_hash)
        .bind(mark_verified)
        .fetch_optional(&self.db)
        .await
        .context("complete password reset")?;
        one(row)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts
               SET name = COALESCE($2, name),
                   location = COALESCE($3, location),
                   profile_photo = COALESCE($4, profile_photo),
                   availability = COALESCE($5, availability),
                   skills_offered = COALESCE($6, skills_offered),
                   skills_wanted = COALESCE($7, skills_wanted),
                   is_public = COALESCE($8, is_public),
                   updated_at = now()
             WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.location)
        .bind(changes.profile_photo)
        .bind(changes.availability)
        .bind(changes.skills_offered)
        .bind(changes.skills_wanted)
        .bind(changes.is_public)
        .fetch_optional(&self.db)
        .await
        .context("update profile")?;
        one(row)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts SET status = $2, updated_at = now()
             WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("set account status")?;
        one(row)
    }

    async fn list_public(&self, skill: Option<&str>) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
              FROM accounts
             WHERE is_public AND status = 'active'
               AND ($1::text IS NULL
                    OR EXISTS (SELECT 1 FROM unnest(skills_offered) s WHERE lower(s) = lower($1)))
             ORDER BY created_at ASC
            "#
        ))
        .bind(skill)
        .fetch_all(&self.db)
        .await
        .context("list public accounts")?;
        many(rows)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list accounts")?;
        many(rows)
    }

    async fn list_verified(&self) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
              FROM accounts
             WHERE is_verified AND status = 'active'
             ORDER BY created_at ASC
            "#
        ))
        .fetch_all(&self.db)
        .await
        .context("list verified accounts")?;
        many(rows)
    }
}
