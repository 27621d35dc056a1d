use std::sync::Arc;

use gateways::{LogMailer, SmtpMailer, XenditClient};
use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "rental={level},server={level},engine={level},gateways={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let mut builder = engine::Engine::builder().database(db);
    match settings.invoice {
        Some(invoice) => {
            tracing::info!("Invoices via {}", invoice.base_url);
            builder = builder.invoices(Arc::new(XenditClient::new(invoice)?));
        }
        None => tracing::warn!("no [invoice] settings, rents will not be invoiced"),
    }
    match settings.mail {
        Some(mail) => {
            tracing::info!("Mail via SMTP {}:{}", mail.host, mail.port);
            builder = builder.notifier(Arc::new(SmtpMailer::new(mail)?));
        }
        None => {
            tracing::info!("no [mail] settings, mails are only logged");
            builder = builder.notifier(Arc::new(LogMailer));
        }
    }
    let engine = builder.build().await?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind((bind.as_str(), settings.server.port)).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = match config {
        // Every pooled connection to `sqlite::memory:` would see its own
        // database, so the pool is pinned to one connection.
        Database::Memory => {
            let mut options = ConnectOptions::new("sqlite::memory:");
            options.max_connections(1);
            options
        }
        Database::Sqlite(path) => ConnectOptions::new(format!("sqlite:{path}?mode=rwc")),
    };
    options.sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
