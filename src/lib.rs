//! walletscope - Solana wallet intelligence bot
//!
//! Resolves wallet addresses into consolidated analysis reports by querying
//! Solscan with a Solana RPC fallback, enriching token holdings with cached
//! metadata, and deriving age/recency/activity metrics. Reports are
//! delivered through a Telegram chat interface or the `verify_addresses`
//! diagnostic CLI.

pub mod config;
pub mod rate_limit;
pub mod security;
pub mod telegram;
pub mod wallet;

// Re-export main types for convenience
pub use config::AppConfig;
pub use rate_limit::UserRateLimiter;
pub use telegram::WalletBot;
pub use wallet::{
    classify, render_report, AccountKind, DataSource, ResolveError, ResolvedWallet,
    RpcFallbackClient, SolscanClient, TokenMetadataResolver, WalletResolver,
};
