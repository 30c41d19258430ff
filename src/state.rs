use std::sync::Arc;

use crate::accounts::repo::{AccountRepo, PgAccountRepo};
use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::mail::{ConsoleMailer, Mailer, Notifier, SmtpMailer};
use crate::store::MemoryStore;
use crate::swaps::repo::{PgSwapRepo, SwapRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountRepo>,
    pub swaps: Arc<dyn SwapRepo>,
    pub notifier: Notifier,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let mailer: Arc<dyn Mailer> = match config.smtp.clone() {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => {
                tracing::warn!("SMTP_* not set; outgoing mail will only be logged");
                Arc::new(ConsoleMailer)
            }
        };

        let (accounts, swaps): (Arc<dyn AccountRepo>, Arc<dyn SwapRepo>) =
            match (config.store_backend, config.database_url.as_deref()) {
                (StoreBackend::Postgres, Some(url)) => {
                    let pool = db::connect(url).await?;
                    db::migrate(&pool).await?;
                    let accounts: Arc<dyn AccountRepo> = Arc::new(PgAccountRepo::new(pool.clone()));
                    let swaps: Arc<dyn SwapRepo> = Arc::new(PgSwapRepo::new(pool));
                    (accounts, swaps)
                }
                (StoreBackend::Postgres, None) => anyhow::bail!("DATABASE_URL is not set"),
                (StoreBackend::Memory, _) => {
                    tracing::warn!("using in-memory store; data is lost on restart");
                    let store = Arc::new(MemoryStore::new());
                    let accounts: Arc<dyn AccountRepo> = store.clone();
                    let swaps: Arc<dyn SwapRepo> = store;
                    (accounts, swaps)
                }
            };

        Ok(Self::from_parts(config, accounts, swaps, mailer))
    }

    pub fn from_parts(
        config: AppConfig,
        accounts: Arc<dyn AccountRepo>,
        swaps: Arc<dyn SwapRepo>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            accounts,
            swaps,
            notifier: Notifier::new(mailer),
        }
    }

    /// Memory-backed state with test configuration and a logging mailer.
    pub fn fake() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(
            AppConfig::for_tests(),
            store.clone(),
            store,
            Arc::new(ConsoleMailer),
        )
    }
}
