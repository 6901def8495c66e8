//! Canonical wallet data model and the resolution error taxonomy.
//!
//! Every upstream source is normalized into these types before any metric
//! derivation or rendering happens. The canonical model is constructed fresh
//! per resolution request and discarded after the report is rendered.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of transaction signatures fetched from either source.
///
/// Counts derived from this window are a capped sample, not a lifetime total,
/// and the report qualifies them as such once the cap is hit.
pub const SIGNATURE_FETCH_LIMIT: usize = 1000;

/// Which upstream produced a resolved wallet record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Solscan HTTP API (primary, price-capable).
    Solscan,
    /// Solana JSON-RPC endpoint (fallback).
    Rpc,
}

impl DataSource {
    /// Short wire label, e.g. for the diagnostic CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Solscan => "solscan",
            DataSource::Rpc => "rpc",
        }
    }

    /// Human-readable name used in the rendered report.
    pub fn display_name(&self) -> &'static str {
        match self {
            DataSource::Solscan => "Solscan API",
            DataSource::Rpc => "Solana RPC",
        }
    }
}

/// Normalized view of an on-chain account, regardless of source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    /// Balance in lamports.
    pub lamports: u64,
    /// True when the account is a deployed program rather than a wallet.
    pub executable: bool,
    /// Controlling program id, when the source exposes it.
    pub owner_program: Option<String>,
    /// Token holdings in source order, at most one entry per mint.
    pub holdings: Vec<TokenHolding>,
    /// Observed transaction signature count (capped sample, see
    /// [`SIGNATURE_FETCH_LIMIT`]).
    pub transaction_count: usize,
    /// Which adapter produced this record.
    pub source: DataSource,
}

/// One token balance within an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHolding {
    /// Token mint address; unique per holding within an account.
    pub mint: String,
    /// String-encoded integer amount in the token's smallest units.
    pub raw_amount: String,
    /// Convenience value derived from `raw_amount` and the token's decimals.
    pub display_amount: f64,
    /// Display symbol; `None` until resolved or synthesized.
    pub symbol: Option<String>,
    /// Display name; `None` until resolved or synthesized.
    pub name: Option<String>,
    /// Unit price in USD; only the primary source supplies this.
    pub unit_price_usd: Option<f64>,
}

/// A single observed transaction signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    /// Epoch seconds; `None` excludes the record from temporal derivations
    /// but it still counts toward `transaction_count`.
    pub block_time: Option<i64>,
}

/// Resolved metadata for a token mint.
///
/// Cached keyed by mint for the process lifetime, never evicted and never
/// refetched. A failed lookup is cached as an entry with absent symbol/name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub mint: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

impl TokenMetadata {
    /// Entry representing a lookup that yielded nothing.
    pub fn unresolved(mint: &str) -> Self {
        Self {
            mint: mint.to_string(),
            symbol: None,
            name: None,
            decimals: None,
        }
    }
}

/// The resolver's complete output for one request: the canonical account plus
/// the retained transaction records used for metric derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedWallet {
    pub account: WalletAccount,
    pub transactions: Vec<TransactionRecord>,
}

/// Failure of a single data source. Recovered locally by switching to the
/// next adapter in priority order; never shown to users directly.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} RPC error {code}: {message}")]
    Rpc {
        service: &'static str,
        code: i64,
        message: String,
    },
    #[error("malformed {service} payload: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
    #[error("account not found")]
    AccountNotFound,
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },
}

impl SourceError {
    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { service, source }
    }

    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            detail: detail.into(),
        }
    }

    /// Upstream HTTP status, when one was observed.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Terminal resolution failure: every adapter in the priority chain failed.
/// The only error type surfaced to the chat layer and the diagnostic CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("wallet address not found")]
    AccountNotFound,
    #[error("upstream rate limited, retry later")]
    RateLimited,
    #[error("could not fetch wallet information")]
    AllSourcesFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels() {
        assert_eq!(DataSource::Solscan.label(), "solscan");
        assert_eq!(DataSource::Rpc.label(), "rpc");
        assert_eq!(DataSource::Solscan.display_name(), "Solscan API");
        assert_eq!(DataSource::Rpc.display_name(), "Solana RPC");
    }

    #[test]
    fn rate_limit_detection() {
        let err = SourceError::Status {
            service: "solscan",
            status: StatusCode::TOO_MANY_REQUESTS,
        };
        assert!(err.is_rate_limited());

        let err = SourceError::Status {
            service: "solscan",
            status: StatusCode::BAD_GATEWAY,
        };
        assert!(!err.is_rate_limited());
        assert!(!SourceError::AccountNotFound.is_rate_limited());
    }

    #[test]
    fn unresolved_metadata_has_absent_fields() {
        let meta = TokenMetadata::unresolved("SomeMint1111111111111111111111111111111111");
        assert!(meta.symbol.is_none());
        assert!(meta.name.is_none());
        assert!(meta.decimals.is_none());
    }
}
