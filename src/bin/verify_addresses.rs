//! Diagnostic CLI for wallet address resolution.
//!
//! Resolves each address given on the command line through the same
//! pipeline as the bot and prints source, classification and holdings to
//! stdout. Useful for checking data-source health without a chat session.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use walletscope::security::is_valid_wallet_address;
use walletscope::wallet::{
    classify, AccountKind, RpcFallbackClient, SolscanClient, TokenMetadataResolver, WalletResolver,
};
use walletscope::AppConfig;

const TOP_TOKENS_PRINTED: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <address> [address ...]", args[0]);
        return Ok(());
    }

    let config = AppConfig::load();
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
    let metadata = Arc::new(TokenMetadataResolver::new(
        solscan.clone(),
        http.clone(),
        config.token_registry_url.clone(),
    ));
    let resolver = WalletResolver::new(
        solscan,
        RpcFallbackClient::new(http, config.rpc_url.clone()),
        metadata,
    );

    for address in &args[1..] {
        if !is_valid_wallet_address(address) {
            println!("Address: {address}");
            println!("  not a valid wallet address, skipping");
            println!();
            continue;
        }
        verify_address(&resolver, address).await;
    }

    Ok(())
}

async fn verify_address(resolver: &WalletResolver, address: &str) {
    println!("Address: {address}");

    match resolver.resolve(address).await {
        Ok(wallet) => {
            let account = &wallet.account;
            println!("  Source: {}", account.source.label());
            println!("  Executable: {}", account.executable);
            println!("  Classified as: {}", classify(account));
            println!("  Transaction count: {}", account.transaction_count);

            if !account.holdings.is_empty() {
                println!("  Tokens:");
                for holding in account.holdings.iter().take(TOP_TOKENS_PRINTED) {
                    let symbol = holding.symbol.as_deref().unwrap_or("Unknown");
                    let name = holding.name.as_deref().unwrap_or(&holding.mint);
                    println!("    - {symbol} ({name}): {}", holding.display_amount);
                }
                if account.holdings.len() > TOP_TOKENS_PRINTED {
                    println!(
                        "    ...and {} more",
                        account.holdings.len() - TOP_TOKENS_PRINTED
                    );
                }
            }
        }
        Err(e) => {
            println!("  Failed to resolve: {e}");
            println!("  Classified as: {}", AccountKind::Unknown);
        }
    }
    println!();
}
