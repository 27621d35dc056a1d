//! Outbound integrations: the Xendit invoice client and mailers.
//!
//! Each type implements one of the engine's gateway traits
//! ([`engine::InvoiceGateway`], [`engine::Notifier`]).

pub use error::GatewayError;
pub use mailer::{LogMailer, SmtpConfig, SmtpMailer};
pub use xendit::{XenditClient, XenditConfig};

mod error;
mod mailer;
mod xendit;

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, GatewayError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}
