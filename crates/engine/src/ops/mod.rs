use std::{fmt, future::Future, pin::Pin, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, InvoiceGateway, Notification, Notifier, ResultEngine, SqlStorage, Storage,
    UnitOfWork,
};

mod bookings;
mod cars;
mod rent;
mod users;

/// Number of times an operation is attempted when it loses a write race.
const MAX_ATTEMPTS: u32 = 2;

type UowFuture<'a, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'a>>;

pub struct Engine {
    storage: Arc<dyn Storage>,
    invoices: Option<Arc<dyn InvoiceGateway>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("invoices", &self.invoices.is_some())
            .field("notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Runs `f` inside one unit of work, committing on success and rolling
    /// back on error.
    ///
    /// If the returned future is dropped early the unit of work is dropped
    /// uncommitted, which discards its writes.
    async fn with_uow<T, F>(&self, f: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'a> FnOnce(&'a dyn UnitOfWork) -> UowFuture<'a, T>,
    {
        let uow = self.storage.begin().await?;
        let result = f(uow.as_ref()).await;
        match result {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!("rollback after \"{err}\" failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// Sends `notification` if a notifier is configured. Failures are logged.
    async fn notify(&self, notification: Notification) {
        let Some(notifier) = &self.notifier else {
            tracing::debug!("no notifier configured, dropping mail to {}", notification.to);
            return;
        };
        let to = notification.to.clone();
        if let Err(err) = notifier.send(notification).await {
            tracing::warn!("failed to notify {to}: {err}");
        }
    }
}

/// Replays `run` once when it fails with [`EngineError::Conflict`].
async fn retry_on_conflict<T, F, Fut>(label: &str, mut run: F) -> ResultEngine<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ResultEngine<T>>,
{
    let mut attempt = 1;
    loop {
        match run().await {
            Err(err) if err.is_conflict() && attempt < MAX_ATTEMPTS => {
                tracing::debug!("{label}: attempt {attempt} lost a write race ({err}), retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    storage: Option<Arc<dyn Storage>>,
    invoices: Option<Arc<dyn InvoiceGateway>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Use a sea-orm connection as storage.
    pub fn database(self, db: DatabaseConnection) -> EngineBuilder {
        self.storage(Arc::new(SqlStorage::new(db)))
    }

    /// Pass the required storage
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> EngineBuilder {
        self.storage = Some(storage);
        self
    }

    /// Invoice provider called after each rent. Without one every rent
    /// reports [`InvoiceError::NotConfigured`](crate::InvoiceError::NotConfigured).
    pub fn invoices(mut self, invoices: Arc<dyn InvoiceGateway>) -> EngineBuilder {
        self.invoices = Some(invoices);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let storage = self
            .storage
            .ok_or_else(|| EngineError::Config("engine storage is required".to_string()))?;
        Ok(Engine {
            storage,
            invoices: self.invoices,
            notifier: self.notifier,
        })
    }
}
