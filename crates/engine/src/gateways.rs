//! Outbound collaborators called after a unit of work has committed.
//!
//! Neither gateway can undo a committed write: invoice failures are reported
//! next to the result, notification failures are only logged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceRequest {
    /// Reference the provider echoes back, e.g. `reservation-42`.
    pub external_id: String,
    pub payer_name: String,
    pub payer_email: String,
    pub item_name: String,
    pub amount: Money,
    pub description: String,
}

/// Provider reference for a created invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub url: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("invoice provider is not configured")]
    NotConfigured,
    #[error("invoice creation failed: {0}")]
    CreationFailed(String),
}

#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, InvoiceError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}
