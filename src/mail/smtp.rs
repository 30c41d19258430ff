use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Mail, Mailer};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpConfig {
    /// Reads `SMTP_*` variables. `None` unless host, username, password and
    /// from address are all set.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        Some(Self {
            host: get_env("SMTP_HOST")?,
            port: get_env("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(465),
            username: get_env("SMTP_USERNAME")?,
            password: get_env("SMTP_PASSWORD")?,
            from_email: get_env("SMTP_FROM_EMAIL")?,
            from_name: get_env("SMTP_FROM_NAME"),
        })
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("create SMTP transport")?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        let from = Mailbox::new(
            config.from_name,
            config.from_email.parse().context("invalid SMTP_FROM_EMAIL")?,
        );

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        let to: Mailbox = mail.to.parse().context("invalid recipient address")?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .context("build message")?;

        self.transport
            .send(message)
            .await
            .context("SMTP send")?;
        Ok(())
    }
}
