//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `RENTAL__*` environment variables
//! (e.g. `RENTAL__SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use gateways::{SmtpConfig, XenditConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub invoice: Option<XenditConfig>,
    pub mail: Option<SmtpConfig>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("RENTAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.database, Database::Memory));
        assert!(settings.invoice.is_none());
        assert!(settings.mail.is_none());
    }

    #[test]
    fn full_settings_are_parsed() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "rental.db" }

            [invoice]
            api_key = "xnd_development_key"

            [mail]
            host = "smtp.example.com"
            username = "rental"
            password = "secret"
            sender_name = "Rental"
            sender_email = "noreply@rental.example"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(settings.server.database, Database::Sqlite(ref path) if path == "rental.db"));
        let invoice = settings.invoice.unwrap();
        assert_eq!(invoice.currency, "IDR");
        assert_eq!(invoice.invoice_duration_secs, 86_400);
        let mail = settings.mail.unwrap();
        assert_eq!(mail.host, "smtp.example.com");
        assert_eq!(mail.port, 587);
        assert!(mail.starttls);
        assert_eq!(mail.timeout_secs, 10);
    }
}
