//! Mail-sending collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

mod console;
mod smtp;
pub mod templates;

pub use self::console::ConsoleMailer;
pub use self::smtp::{SmtpConfig, SmtpMailer};

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()>;
}

/// Dispatches mail either awaited (caller needs the outcome) or in the
/// background (caller does not wait on the provider).
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Sends and reports whether delivery succeeded. Failures are logged.
    pub async fn deliver(&self, mail: Mail) -> bool {
        match self.mailer.send(&mail).await {
            Ok(()) => {
                info!(to = %mail.to, subject = %mail.subject, "mail sent");
                true
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), to = %mail.to, subject = %mail.subject, "mail delivery failed");
                false
            }
        }
    }

    /// Fire-and-forget delivery.
    pub fn spawn(&self, mail: Mail) {
        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(mail).await;
        });
    }
}
