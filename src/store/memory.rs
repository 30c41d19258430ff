//! In-memory persistence for tests and `STORE_BACKEND=memory` runs.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accounts::repo::AccountRepo;
use crate::accounts::repo_types::{Account, AccountStatus, NewAccount, ProfileChanges, Role};
use crate::swaps::repo::SwapRepo;
use crate::swaps::repo_types::{NewSwapRequest, SwapRequest, SwapStatus};

/// Accounts and swap requests kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<Vec<Account>>,
    swaps: RwLock<Vec<SwapRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, id: Uuid, f: F) -> Option<Account>
    where
        F: FnOnce(&mut Account),
    {
        let mut accounts = self.accounts.write().await;
        let account = accounts.iter_mut().find(|a| a.id == id)?;
        f(account);
        account.updated_at = OffsetDateTime::now_utc();
        Some(account.clone())
    }

    /// Moves the OTP expiry into the past (for testing purposes).
    pub async fn expire_otp(&self, email: &str) {
        let mut accounts = self.accounts.write().await;
        if let Some(a) = accounts.iter_mut().find(|a| a.email == email) {
            a.otp_expires = Some(OffsetDateTime::now_utc() - time::Duration::seconds(1));
        }
    }

    /// Moves the reset-token expiry into the past (for testing purposes).
    pub async fn expire_reset_token(&self, email: &str) {
        let mut accounts = self.accounts.write().await;
        if let Some(a) = accounts.iter_mut().find(|a| a.email == email) {
            a.password_reset_expires = Some(OffsetDateTime::now_utc() - time::Duration::seconds(1));
        }
    }

    /// Grants the admin role (for testing purposes).
    pub async fn promote_to_admin(&self, email: &str) {
        let mut accounts = self.accounts.write().await;
        if let Some(a) = accounts.iter_mut().find(|a| a.email == email) {
            a.role = Role::Admin;
        }
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn create(&self, new: NewAccount) -> anyhow::Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == new.email) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            profile_photo: new.profile_photo,
            location: None,
            skills_offered: Vec::new(),
            skills_wanted: Vec::new(),
            availability: None,
            is_public: true,
            role: Role::User,
            status: AccountStatus::Active,
            is_verified: false,
            otp: Some(new.otp),
            otp_expires: Some(new.otp_expires),
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(Some(account))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Ok(self.accounts.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn set_otp(&self, id: Uuid, otp: &str, expires: OffsetDateTime) -> anyhow::Result<()> {
        self.modify(id, |a| {
            a.otp = Some(otp.to_string());
            a.otp_expires = Some(expires);
        })
        .await;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> anyhow::Result<()> {
        self.modify(id, |a| {
            a.is_verified = true;
            a.otp = None;
            a.otp_expires = None;
        })
        .await;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, OffsetDateTime)>,
    ) -> anyhow::Result<()> {
        self.modify(id, |a| match token {
            Some((digest, expires)) => {
                a.password_reset_token = Some(digest.to_string());
                a.password_reset_expires = Some(expires);
            }
            None => {
                a.password_reset_token = None;
                a.password_reset_expires = None;
            }
        })
        .await;
        Ok(())
    }

    async fn complete_reset(
        &self,
        digest: &str,
        now: OffsetDateTime,
        password_hash: &str,
        mark_verified: bool,
    ) -> anyhow::Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts.iter_mut().find(|a| {
            a.password_reset_token.as_deref() == Some(digest)
                && a.password_reset_expires.is_some_and(|exp| exp > now)
        }) else {
            return Ok(None);
        };
        account.password_hash = password_hash.to_string();
        account.password_reset_token = None;
        account.password_reset_expires = None;
        account.is_verified |= mark_verified;
        account.updated_at = OffsetDateTime::now_utc();
        Ok(Some(account.clone()))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> anyhow::Result<Option<Account>> {
        Ok(self.modify(id, |a| changes.apply(a)).await)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> anyhow::Result<Option<Account>> {
        Ok(self.modify(id, |a| a.status = status).await)
    }

    async fn list_public(&self, skill: Option<&str>) -> anyhow::Result<Vec<Account>> {
        let skill = skill.map(str::to_lowercase);
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .filter(|a| a.is_discoverable())
            .filter(|a| match &skill {
                Some(skill) => a.skills_offered.iter().any(|s| s.to_lowercase() == *skill),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self.accounts.read().await.clone())
    }

    async fn list_verified(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .filter(|a| a.is_verified && !a.is_banned())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SwapRepo for MemoryStore {
    async fn create(&self, new: NewSwapRequest) -> anyhow::Result<SwapRequest> {
        let now = OffsetDateTime::now_utc();
        let swap = SwapRequest {
            id: Uuid::new_v4(),
            sender: new.sender,
            recipient: new.recipient,
            skills_involved: new.skills_involved,
            message: new.message,
            status: SwapStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.swaps.write().await.push(swap.clone());
        Ok(swap)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SwapRequest>> {
        Ok(self.swaps.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_sender(&self, sender: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        Ok(self
            .swaps
            .read()
            .await
            .iter()
            .rev()
            .filter(|s| s.sender == sender)
            .cloned()
            .collect())
    }

    async fn list_by_recipient(&self, recipient: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        Ok(self
            .swaps
            .read()
            .await
            .iter()
            .rev()
            .filter(|s| s.recipient == recipient)
            .cloned()
            .collect())
    }

    async fn transition_if_pending(
        &self,
        id: Uuid,
        status: SwapStatus,
    ) -> anyhow::Result<Option<SwapRequest>> {
        let mut swaps = self.swaps.write().await;
        let Some(swap) = swaps
            .iter_mut()
            .find(|s| s.id == id && s.status == SwapStatus::Pending)
        else {
            return Ok(None);
        };
        swap.status = status;
        swap.updated_at = OffsetDateTime::now_utc();
        Ok(Some(swap.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut swaps = self.swaps.write().await;
        let before = swaps.len();
        swaps.retain(|s| s.id != id);
        Ok(swaps.len() != before)
    }

    async fn count_by_status(&self) -> anyhow::Result<Vec<(SwapStatus, i64)>> {
        let swaps = self.swaps.read().await;
        Ok(SwapStatus::ALL
            .into_iter()
            .map(|st| (st, swaps.iter().filter(|s| s.status == st).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}
