//! Xendit v2 invoice client.

use std::str::FromStr;

use async_trait::async_trait;
use engine::{Invoice, InvoiceError, InvoiceGateway, InvoiceRequest};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{GatewayError, http_client};

const INVOICES_PATH: &str = "v2/invoices";

#[derive(Clone, Debug, Deserialize)]
pub struct XenditConfig {
    /// API root, e.g. `https://api.xendit.co`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Secret API key, sent as the basic-auth username.
    pub api_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How long the payment link stays valid.
    #[serde(default = "default_invoice_duration_secs")]
    pub invoice_duration_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.xendit.co".to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_invoice_duration_secs() -> u64 {
    86_400
}

fn default_timeout_secs() -> u64 {
    10
}

impl XenditConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            currency: default_currency(),
            invoice_duration_secs: default_invoice_duration_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct CreateInvoice<'a> {
    external_id: &'a str,
    amount: serde_json::Number,
    description: &'a str,
    invoice_duration: u64,
    customer: Customer<'a>,
    currency: &'a str,
    items: [Item<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Customer<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Item<'a> {
    name: &'a str,
    quantity: u32,
    price: serde_json::Number,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    id: Option<String>,
    invoice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug, Clone)]
pub struct XenditClient {
    endpoint: Url,
    api_key: String,
    currency: String,
    invoice_duration_secs: u64,
    http: reqwest::Client,
}

impl XenditClient {
    pub fn new(config: XenditConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Missing("invoice.api_key"));
        }
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(INVOICES_PATH))
            .map_err(|err| GatewayError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        Ok(Self {
            endpoint,
            api_key: config.api_key,
            currency: config.currency,
            invoice_duration_secs: config.invoice_duration_secs,
            http: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl InvoiceGateway for XenditClient {
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, InvoiceError> {
        // Money renders as a plain "123.45" decimal in major units.
        let amount = serde_json::Number::from_str(&request.amount.to_string())
            .map_err(|err| InvoiceError::CreationFailed(format!("invalid amount: {err}")))?;
        let payload = CreateInvoice {
            external_id: &request.external_id,
            amount: amount.clone(),
            description: &request.description,
            invoice_duration: self.invoice_duration_secs,
            customer: Customer {
                name: &request.payer_name,
                email: &request.payer_email,
            },
            currency: &self.currency,
            items: [Item {
                name: &request.item_name,
                quantity: 1,
                price: amount,
            }],
        };

        let res = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.api_key, None::<&str>)
            .json(&payload)
            .send()
            .await
            .map_err(|err| InvoiceError::CreationFailed(format!("transport error: {err}")))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res
                .json::<ErrorResponse>()
                .await
                .map(|err| err.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(InvoiceError::CreationFailed(format!(
                "provider returned {status}: {detail}"
            )));
        }

        let body = res
            .json::<InvoiceResponse>()
            .await
            .map_err(|err| InvoiceError::CreationFailed(format!("invalid response: {err}")))?;
        match (body.id, body.invoice_url) {
            (Some(id), Some(url)) => {
                tracing::info!("invoice {id} created for {}", request.external_id);
                Ok(Invoice { id, url })
            }
            _ => Err(InvoiceError::CreationFailed(
                "response is missing id or invoice_url".to_string(),
            )),
        }
    }
}
