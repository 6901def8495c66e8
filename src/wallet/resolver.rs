//! Wallet data resolution: source selection with fallback, normalization
//! into the canonical model, and per-holding metadata enrichment.
//!
//! The primary source is tried first. Any failure (transport, non-2xx,
//! malformed payload) switches unconditionally to the fallback; there is no
//! partial retry of the primary and no merging of partial results between
//! sources. Exactly one source's data populates the resolved wallet, and its
//! identity is recorded on the canonical account.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::metadata::TokenMetadataResolver;
use super::rpc::{RpcBundle, RpcFallbackClient};
use super::solscan::{SolscanBundle, SolscanClient};
use super::types::{
    DataSource, ResolveError, ResolvedWallet, SourceError, TokenHolding, TransactionRecord,
    WalletAccount,
};

/// Orchestrates the source adapters and the metadata resolver.
pub struct WalletResolver {
    solscan: Option<Arc<SolscanClient>>,
    rpc: RpcFallbackClient,
    metadata: Arc<TokenMetadataResolver>,
}

impl WalletResolver {
    /// `solscan` is `None` when no API credential is configured; resolution
    /// then goes straight to the fallback source.
    pub fn new(
        solscan: Option<Arc<SolscanClient>>,
        rpc: RpcFallbackClient,
        metadata: Arc<TokenMetadataResolver>,
    ) -> Self {
        Self {
            solscan,
            rpc,
            metadata,
        }
    }

    /// Resolve a wallet address into the canonical model, enriched with
    /// token metadata. Fails only when every source in the priority chain
    /// has failed.
    pub async fn resolve(&self, address: &str) -> Result<ResolvedWallet, ResolveError> {
        let primary_err = match &self.solscan {
            Some(client) => match client.fetch_wallet(address).await {
                Ok(bundle) => {
                    let mut wallet = normalize_solscan(bundle);
                    self.enrich_holdings(&mut wallet.account.holdings).await;
                    return Ok(wallet);
                }
                Err(e) => {
                    warn!(address, "solscan fetch failed, switching to rpc fallback: {e}");
                    e
                }
            },
            None => {
                debug!(address, "no solscan credential configured, using rpc fallback");
                SourceError::NotConfigured { service: "solscan" }
            }
        };

        match self.rpc.fetch_wallet(address).await {
            Ok(bundle) => {
                let mut wallet = normalize_rpc(bundle);
                self.enrich_holdings(&mut wallet.account.holdings).await;
                Ok(wallet)
            }
            Err(fallback_err) => {
                error!(address, "all wallet data sources failed: {fallback_err}");
                Err(map_failure(&primary_err, &fallback_err))
            }
        }
    }

    /// Enrich holdings one at a time, in holdings order. A failed lookup for
    /// one holding degrades that holding to placeholder display values and
    /// does not affect the others.
    async fn enrich_holdings(&self, holdings: &mut [TokenHolding]) {
        for holding in holdings.iter_mut() {
            let meta = self.metadata.resolve(&holding.mint).await;

            if meta.symbol.is_some() {
                holding.symbol = meta.symbol;
            }
            if meta.name.is_some() {
                holding.name = meta.name;
            }

            if holding.display_amount == 0.0 {
                if let (Ok(raw), Some(decimals)) =
                    (holding.raw_amount.parse::<f64>(), meta.decimals)
                {
                    if raw > 0.0 {
                        holding.display_amount = raw / 10f64.powi(decimals as i32);
                    }
                }
            }

            if holding.symbol.as_deref().map_or(true, str::is_empty) {
                holding.symbol = Some(placeholder_symbol(&holding.mint));
            }
            if holding.name.as_deref().map_or(true, str::is_empty) {
                holding.name = Some(holding.mint.clone());
            }
        }
    }
}

/// Map a pair of exhausted source failures to the user-visible taxonomy.
/// A not-found from the fallback dominates; any rate-limit status from
/// either source is surfaced as such; everything else is the catch-all.
fn map_failure(primary: &SourceError, fallback: &SourceError) -> ResolveError {
    if matches!(fallback, SourceError::AccountNotFound) {
        return ResolveError::AccountNotFound;
    }
    if primary.is_rate_limited() || fallback.is_rate_limited() {
        return ResolveError::RateLimited;
    }
    ResolveError::AllSourcesFailed
}

/// Synthesized symbol for a holding whose metadata never resolved: a
/// truncated mint prefix, guaranteed non-empty.
fn placeholder_symbol(mint: &str) -> String {
    let prefix: String = mint.chars().take(5).collect();
    format!("{prefix}...")
}

fn derive_display_amount(raw_amount: &str, decimals: Option<u8>) -> f64 {
    let raw = raw_amount.parse::<f64>().unwrap_or(0.0);
    match decimals {
        Some(d) => raw / 10f64.powi(d as i32),
        None => raw,
    }
}

/// Insert a holding keeping at most one entry per mint. Insertion order is
/// source order of the first occurrence; on a duplicate the last-seen value
/// wins in place.
fn push_deduped(
    holdings: &mut Vec<TokenHolding>,
    index: &mut HashMap<String, usize>,
    holding: TokenHolding,
) {
    match index.get(&holding.mint) {
        Some(&at) => holdings[at] = holding,
        None => {
            index.insert(holding.mint.clone(), holdings.len());
            holdings.push(holding);
        }
    }
}

fn absent_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Normalize a Solscan bundle into the canonical model.
pub fn normalize_solscan(bundle: SolscanBundle) -> ResolvedWallet {
    let mut holdings = Vec::new();
    let mut index = HashMap::new();

    for token in bundle.tokens {
        let Some(mint) = token.mint_address.filter(|m| !m.is_empty()) else {
            continue;
        };
        let amount = token.token_amount.unwrap_or_default();
        let raw_amount = amount.amount.filter(|a| !a.is_empty()).unwrap_or_else(|| "0".to_string());
        let display_amount = amount
            .ui_amount
            .unwrap_or_else(|| derive_display_amount(&raw_amount, amount.decimals));

        push_deduped(
            &mut holdings,
            &mut index,
            TokenHolding {
                mint,
                raw_amount,
                display_amount,
                symbol: absent_if_empty(token.token_symbol),
                name: absent_if_empty(token.token_name),
                unit_price_usd: token.token_price,
            },
        );
    }

    let transactions: Vec<TransactionRecord> = bundle
        .transactions
        .into_iter()
        .map(|tx| TransactionRecord {
            signature: tx.signature.unwrap_or_default(),
            block_time: tx.block_time,
        })
        .collect();

    let account = WalletAccount {
        lamports: bundle.account.lamports.unwrap_or(0),
        executable: bundle.account.executable.unwrap_or(false),
        owner_program: absent_if_empty(bundle.account.owner_program),
        holdings,
        transaction_count: transactions.len(),
        source: DataSource::Solscan,
    };

    ResolvedWallet {
        account,
        transactions,
    }
}

/// Normalize an RPC bundle into the canonical model.
pub fn normalize_rpc(bundle: RpcBundle) -> ResolvedWallet {
    let mut holdings = Vec::new();
    let mut index = HashMap::new();

    for keyed in bundle.token_accounts {
        let info = keyed.account.data.parsed.info;
        if info.mint.is_empty() {
            continue;
        }
        let amount = info.token_amount.unwrap_or_default();
        let raw_amount = if amount.amount.is_empty() {
            "0".to_string()
        } else {
            amount.amount
        };
        let display_amount = amount
            .ui_amount
            .unwrap_or_else(|| derive_display_amount(&raw_amount, amount.decimals));

        push_deduped(
            &mut holdings,
            &mut index,
            TokenHolding {
                mint: info.mint,
                raw_amount,
                display_amount,
                symbol: None,
                name: None,
                unit_price_usd: None,
            },
        );
    }

    let transactions: Vec<TransactionRecord> = bundle
        .signatures
        .into_iter()
        .map(|sig| TransactionRecord {
            signature: sig.signature,
            block_time: sig.block_time,
        })
        .collect();

    let account = WalletAccount {
        lamports: bundle.account.lamports,
        executable: bundle.account.executable,
        owner_program: absent_if_empty(bundle.account.owner),
        holdings,
        transaction_count: transactions.len(),
        source: DataSource::Rpc,
    };

    ResolvedWallet {
        account,
        transactions,
    }
}
