//! Application configuration and logging setup.
//!
//! Configuration is read from `config.toml` with environment-variable
//! overrides for secrets, falling back to defaults when no file exists.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

use crate::wallet::metadata::TOKEN_REGISTRY_URL;
use crate::wallet::solscan::SOLSCAN_BASE_URL;

/// Main configuration for the wallet analysis bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Telegram bot token; normally supplied via `TELEGRAM_BOT_TOKEN`.
    pub telegram_bot_token: String,
    /// Solscan API credential; the primary source is skipped without one.
    pub solscan_api_key: Option<String>,
    pub solscan_base_url: String,
    pub rpc_url: String,
    pub token_registry_url: String,
    /// Timeout applied to every outbound request.
    pub request_timeout_secs: u64,
    /// Per-user admission control quota.
    pub requests_per_minute: u32,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            solscan_api_key: None,
            solscan_base_url: SOLSCAN_BASE_URL.to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            token_registry_url: TOKEN_REGISTRY_URL.to_string(),
            request_timeout_secs: 10,
            requests_per_minute: 10,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `config.toml` when present, otherwise defaults; env
    /// overrides apply either way.
    pub fn load() -> Self {
        match Self::from_toml_file("config.toml") {
            Ok(config) => {
                tracing::info!("Loaded config from config.toml");
                config
            }
            Err(_) => {
                tracing::info!("Using default config");
                let mut config = Self::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = token;
        }
        if let Ok(key) = std::env::var("SOLSCAN_API_KEY") {
            if !key.is_empty() {
                self.solscan_api_key = Some(key);
            }
        }
        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            self.rpc_url = rpc_url;
        }
    }

    fn validate(&self) -> Result<()> {
        crate::security::validate_rpc_url(&self.rpc_url)?;
        Ok(())
    }

    pub fn init_logging(&self) {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        tracing_subscriber::fmt().with_max_level(level).init();
    }
}
