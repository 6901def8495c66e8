//! Wallet data resolution and enrichment pipeline.
//!
//! Resolves a wallet address into a normalized, human-readable analysis
//! report: source selection with fallback (Solscan first, Solana RPC
//! second), normalization into a canonical schema, per-mint metadata
//! enrichment backed by a process-lifetime cache, and derived temporal and
//! activity metrics for report rendering.

pub mod classifier;
pub mod metadata;
pub mod report;
pub mod resolver;
pub mod rpc;
pub mod solscan;
pub mod types;

// Re-export the pipeline surface.
pub use classifier::{classify, AccountKind};
pub use metadata::{TokenMetadataResolver, SOLSCAN_META_FAILURE_LIMIT, TOKEN_REGISTRY_URL};
pub use report::{render_report, render_report_at, ActivityLevel, TOP_HOLDINGS_RENDERED};
pub use resolver::{normalize_rpc, normalize_solscan, WalletResolver};
pub use rpc::{RpcFallbackClient, TOKEN_PROGRAM_ID};
pub use solscan::{SolscanClient, SOLSCAN_BASE_URL};
pub use types::{
    DataSource, ResolveError, ResolvedWallet, SourceError, TokenHolding, TokenMetadata,
    TransactionRecord, WalletAccount, SIGNATURE_FETCH_LIMIT,
};
