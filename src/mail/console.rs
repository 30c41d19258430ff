use async_trait::async_trait;

use super::{Mail, Mailer};

/// Mailer used when SMTP is not configured: writes the message to the log.
#[derive(Debug, Default, Clone)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.text,
            "SMTP not configured; mail written to log"
        );
        Ok(())
    }
}
