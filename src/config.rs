use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::withdrawal::PayoutMethod;

/// Loads configuration from a given config file or environment variables.
pub fn load_config(config_file_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    // Load .env file if it exists, ignore if not present
    dotenv().ok();

    let mut settings = Config::builder();

    if let Some(path) = config_file_path {
        settings = settings.add_source(File::from(path).required(true));
    }

    // e.g. WITHDRAWAL_DESK__ADMIN__OPERATOR_KEY
    settings = settings.add_source(
        Environment::with_prefix("WITHDRAWAL_DESK")
            .prefix_separator("__")
            .separator("__"),
    );

    let app_config = settings.build()?.try_deserialize::<AppConfig>()?;

    Ok(app_config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Absent means records are kept in memory for the lifetime of the process.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub admin: AdminConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub desk: DeskConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn get_db_url(&self) -> anyhow::Result<String> {
        std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set in environment or .env file"))
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared operator key expected in the `X-Admin-Key` header.
    pub operator_key: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("operator_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    pub admin_chat_id: i64,
}

impl TelegramConfig {
    pub fn get_bot_token(&self) -> Option<String> {
        std::env::var("TELEGRAM_BOT_TOKEN").ok()
    }
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Base URL of the processing service, used by the console.
    pub service_url: String,
    pub payout_method: PayoutMethod,
    pub review_notice_delay_ms: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8080/".to_string(),
            payout_method: PayoutMethod::Sbp,
            review_notice_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String, // "debug" | "info" | "warn" | "error"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_file_with_optional_sections_defaulted() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9090

[admin]
operator_key = "file-key"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.admin.operator_key, "file-key");
        assert!(config.database.is_none());
        assert!(config.telegram.is_none());
        assert_eq!(config.desk, DeskConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn telegram_api_base_has_default() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[admin]
operator_key = "k"

[telegram]
admin_chat_id = 42

[desk]
service_url = "http://payouts.internal/"
payout_method = "card"
review_notice_delay_ms = 500
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        let telegram = config.telegram.unwrap();

        assert_eq!(telegram.api_base, "https://api.telegram.org");
        assert_eq!(telegram.admin_chat_id, 42);
        assert_eq!(config.desk.payout_method, PayoutMethod::Card);
        assert_eq!(config.desk.review_notice_delay_ms, 500);
    }

    #[test]
    fn operator_key_is_redacted_in_debug_output() {
        let admin = AdminConfig {
            operator_key: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", admin).contains("super-secret"));
    }
}
