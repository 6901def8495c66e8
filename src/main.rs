//! Main entry point for the walletscope bot.
//! Wires the resolution pipeline and runs the Telegram polling loop.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use walletscope::wallet::{RpcFallbackClient, SolscanClient, TokenMetadataResolver, WalletResolver};
use walletscope::{AppConfig, UserRateLimiter, WalletBot};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load();
    config.init_logging();

    if config.telegram_bot_token.is_empty() {
        anyhow::bail!("TELEGRAM_BOT_TOKEN is not configured");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let solscan = config.solscan_api_key.as_ref().map(|key| {
        Arc::new(SolscanClient::new(
            http.clone(),
            config.solscan_base_url.clone(),
            key.clone(),
        ))
    });
    if solscan.is_none() {
        tracing::warn!("no SOLSCAN_API_KEY configured, resolving via RPC fallback only");
    }

    let metadata = Arc::new(TokenMetadataResolver::new(
        solscan.clone(),
        http.clone(),
        config.token_registry_url.clone(),
    ));
    let resolver = Arc::new(WalletResolver::new(
        solscan,
        RpcFallbackClient::new(http.clone(), config.rpc_url.clone()),
        metadata,
    ));

    let rate_limiter = Arc::new(UserRateLimiter::new(config.requests_per_minute));
    let bot = WalletBot::new(
        http,
        config.telegram_bot_token.clone(),
        resolver,
        rate_limiter.clone(),
    );

    tokio::spawn({
        let rate_limiter = rate_limiter.clone();
        async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup_old_entries().await;
            }
        }
    });

    tracing::info!("Starting walletscope bot");

    tokio::select! {
        result = bot.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    Ok(())
}
