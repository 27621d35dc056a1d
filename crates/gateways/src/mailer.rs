//! Mail delivery.
//!
//! [`SmtpMailer`] submits messages to an SMTP server with plain
//! username/password authentication; [`LogMailer`] only writes them to the
//! log and is used when no server is configured.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use engine::{Notification, Notifier, NotifyError};
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;

use crate::GatewayError;

#[derive(Clone, Debug, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Empty for servers that accept unauthenticated submission.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub sender_name: String,
    pub sender_email: String,
    /// Upgrade the connection with STARTTLS. Only disable it for local
    /// test servers.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("sender", &self.sender.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, GatewayError> {
        if config.host.trim().is_empty() {
            return Err(GatewayError::Missing("mail.host"));
        }
        let address = config
            .sender_email
            .trim()
            .parse::<Address>()
            .map_err(|err| {
                GatewayError::InvalidAddress(format!("{}: {err}", config.sender_email))
            })?;
        let sender = Mailbox::new(Some(config.sender_name), address);

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
        };
        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(config.username, config.password));
        }

        Ok(Self {
            host: config.host,
            sender,
            transport: builder.build(),
        })
    }

    fn message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let to = notification
            .to
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Failed(format!("invalid recipient: {err}")))?;
        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|err| NotifyError::Failed(format!("invalid message: {err}")))
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let message = self.message(&notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| NotifyError::Failed(format!("smtp error: {err}")))?;
        tracing::debug!("mail \"{}\" sent to {}", notification.subject, notification.to);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            "mail to {} \"{}\":\n{}",
            notification.to,
            notification.subject,
            notification.body
        );
        Ok(())
    }
}
