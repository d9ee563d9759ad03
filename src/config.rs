// ⚙️ Configuration - environment-driven settings for the binaries

use anyhow::{ensure, Context, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SECRET: &str = "mi_clave_secreta_de_32_caracteres";
const DEFAULT_ARTICLES_PATH: &str = "data/articles.json";
const DEFAULT_RATES_PATH: &str = "data/exchange_rates.json";

/// Application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the API server binds to
    pub port: u16,
    /// Secret the cipher key is derived from (normalized to 32 bytes)
    pub encryption_key: String,
    /// Path of the article collection file
    pub articles_path: PathBuf,
    /// Path of the exchange-rate table file
    pub rates_path: PathBuf,
}

impl AppConfig {
    /// Read configuration from environment variables, with defaults for
    /// local development.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            Err(_) => DEFAULT_PORT,
        };
        ensure!(port > 0, "PORT must be between 1 and 65535");

        let encryption_key =
            env::var("ENCRYPTION_KEY").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        let articles_path = env::var("ARTICLES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTICLES_PATH));

        let rates_path = env::var("EXCHANGE_RATES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RATES_PATH));

        Ok(AppConfig {
            port,
            encryption_key,
            articles_path,
            rates_path,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            encryption_key: DEFAULT_SECRET.to_string(),
            articles_path: PathBuf::from(DEFAULT_ARTICLES_PATH),
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
        }
    }
}
