use thiserror::Error;

/// Errors raised while building a gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
