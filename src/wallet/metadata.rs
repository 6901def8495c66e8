//! Tiered token metadata resolution with a process-lifetime cache.
//!
//! Lookup order per cache miss:
//! 1. Solscan token-meta endpoint, gated by a monotonic failure counter.
//!    Once the counter passes [`SOLSCAN_META_FAILURE_LIMIT`] the endpoint is
//!    skipped for the remainder of the process; successes do not reset it.
//! 2. A static token registry, fetched once per process and memoized. A load
//!    failure is memoized as an empty registry.
//! 3. An entry with absent symbol/name, which callers turn into a
//!    placeholder display value.
//!
//! Every outcome, including total failure, is written into the mint-keyed
//! cache so a given mint is looked up at most once per process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, error, info, warn};

use super::solscan::SolscanClient;
use super::types::TokenMetadata;

/// Consecutive Solscan metadata failures tolerated before the endpoint is
/// skipped for the rest of the process lifetime.
pub const SOLSCAN_META_FAILURE_LIMIT: u32 = 3;

/// Default URL of the static Solana token registry.
pub const TOKEN_REGISTRY_URL: &str =
    "https://cdn.jsdelivr.net/gh/solana-labs/token-list@main/src/tokens/solana.tokenlist.json";

#[derive(Debug, Deserialize)]
struct TokenRegistryFile {
    #[serde(default)]
    tokens: Vec<TokenRegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenRegistryEntry {
    address: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    decimals: Option<u8>,
}

/// Resolves token mints to display metadata through the tiered lookup.
pub struct TokenMetadataResolver {
    solscan: Option<Arc<SolscanClient>>,
    http: Client,
    registry_url: String,
    cache: RwLock<HashMap<String, TokenMetadata>>,
    registry: OnceCell<HashMap<String, TokenMetadata>>,
    solscan_failures: AtomicU32,
}

impl TokenMetadataResolver {
    /// `solscan` is `None` when no API credential is configured; the registry
    /// tier still applies.
    pub fn new(
        solscan: Option<Arc<SolscanClient>>,
        http: Client,
        registry_url: impl Into<String>,
    ) -> Self {
        Self {
            solscan,
            http,
            registry_url: registry_url.into(),
            cache: RwLock::new(HashMap::new()),
            registry: OnceCell::new(),
            solscan_failures: AtomicU32::new(0),
        }
    }

    /// Resolve metadata for a mint. Never fails: on total lookup failure the
    /// returned entry has absent symbol and name, and that outcome is cached
    /// like any other so the lookup is not retried.
    pub async fn resolve(&self, mint: &str) -> TokenMetadata {
        if let Some(hit) = self.cache.read().await.get(mint) {
            return hit.clone();
        }

        let mut entry = self.fetch_solscan_meta(mint).await;

        if entry.is_none() {
            entry = self.registry().await.get(mint).cloned();
        }

        let entry = entry.unwrap_or_else(|| TokenMetadata::unresolved(mint));

        self.cache
            .write()
            .await
            .insert(mint.to_string(), entry.clone());
        entry
    }

    /// Number of Solscan metadata failures observed so far.
    pub fn solscan_failure_count(&self) -> u32 {
        self.solscan_failures.load(Ordering::Relaxed)
    }

    async fn fetch_solscan_meta(&self, mint: &str) -> Option<TokenMetadata> {
        let client = self.solscan.as_ref()?;

        if self.solscan_failures.load(Ordering::Relaxed) > SOLSCAN_META_FAILURE_LIMIT {
            debug!(mint, "solscan metadata lookups disabled after repeated failures");
            return None;
        }

        match client.token_meta(mint).await {
            Ok(meta) => Some(TokenMetadata {
                mint: mint.to_string(),
                symbol: meta.symbol,
                name: meta.name,
                decimals: meta.decimals,
            }),
            Err(e) => {
                let failures = self.solscan_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(mint, failures, "solscan token metadata fetch failed: {e}");
                None
            }
        }
    }

    /// The static registry, loaded at most once per process. Failures yield
    /// an empty registry rather than propagating.
    async fn registry(&self) -> &HashMap<String, TokenMetadata> {
        self.registry
            .get_or_init(|| async {
                match self.load_registry().await {
                    Ok(map) => {
                        info!("loaded {} token registry entries", map.len());
                        map
                    }
                    Err(e) => {
                        error!("failed to load token registry: {e:#}");
                        HashMap::new()
                    }
                }
            })
            .await
    }

    async fn load_registry(&self) -> Result<HashMap<String, TokenMetadata>> {
        let response = self
            .http
            .get(&self.registry_url)
            .send()
            .await
            .context("token registry request failed")?;

        let file: TokenRegistryFile = response
            .error_for_status()
            .context("token registry returned error status")?
            .json()
            .await
            .context("token registry payload did not parse")?;

        let mut map = HashMap::with_capacity(file.tokens.len());
        for token in file.tokens {
            let Some(address) = token.address.filter(|a| !a.is_empty()) else {
                continue;
            };
            map.insert(
                address.clone(),
                TokenMetadata {
                    mint: address,
                    symbol: token.symbol,
                    name: token.name,
                    decimals: token.decimals,
                },
            );
        }
        Ok(map)
    }

    #[cfg(test)]
    fn seed_registry(&self, map: HashMap<String, TokenMetadata>) {
        self.registry
            .set(map)
            .expect("registry seeded more than once");
    }
}
