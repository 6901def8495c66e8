//! Primary data source: the Solscan HTTP API.
//!
//! Fetches account summary, token holdings and transaction history with three
//! concurrent requests, awaited jointly. All three must succeed or the fetch
//! fails as a whole; there is no partial success. Also exposes the token
//! metadata endpoint used by the metadata resolver.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::types::{SourceError, SIGNATURE_FETCH_LIMIT};

const SERVICE: &str = "solscan";

/// Default base URL for the Solscan API.
pub const SOLSCAN_BASE_URL: &str = "https://api.solscan.io";

/// Account summary in Solscan's native shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolscanAccount {
    pub lamports: Option<u64>,
    pub executable: Option<bool>,
    pub owner_program: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolscanTokenAmount {
    pub amount: Option<String>,
    pub decimals: Option<u8>,
    pub ui_amount: Option<f64>,
}

/// One token holding row in Solscan's native shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolscanTokenHolding {
    pub mint_address: Option<String>,
    pub token_amount: Option<SolscanTokenAmount>,
    pub token_symbol: Option<String>,
    pub token_name: Option<String>,
    pub token_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolscanTransaction {
    #[serde(alias = "txHash")]
    pub signature: Option<String>,
    pub block_time: Option<i64>,
}

/// Token metadata in Solscan's native shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolscanTokenMeta {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

/// Raw payloads from one all-or-nothing wallet fetch, not yet normalized.
#[derive(Debug, Clone)]
pub struct SolscanBundle {
    pub account: SolscanAccount,
    pub tokens: Vec<SolscanTokenHolding>,
    pub transactions: Vec<SolscanTransaction>,
}

/// Client for the Solscan API, authenticated with a bearer credential.
pub struct SolscanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SolscanClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| SourceError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                service: SERVICE,
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::malformed(SERVICE, e.to_string()))
    }

    /// Fetch account summary, token holdings and transaction history for a
    /// wallet address. The three requests run concurrently and are awaited
    /// jointly; any failure fails the whole fetch.
    pub async fn fetch_wallet(&self, address: &str) -> Result<SolscanBundle, SourceError> {
        debug!(address, "fetching wallet data from solscan");

        let account_path = format!("/account?address={address}");
        let tokens_path = format!("/account/tokens?address={address}");
        let transactions_path =
            format!("/account/transactions?address={address}&limit={SIGNATURE_FETCH_LIMIT}");

        let (account, tokens, transactions) = tokio::try_join!(
            self.get_json::<SolscanAccount>(&account_path),
            self.get_json::<Vec<SolscanTokenHolding>>(&tokens_path),
            self.get_json::<Vec<SolscanTransaction>>(&transactions_path),
        )?;

        Ok(SolscanBundle {
            account,
            tokens,
            transactions,
        })
    }

    /// Fetch display metadata for a token mint.
    pub async fn token_meta(&self, mint: &str) -> Result<SolscanTokenMeta, SourceError> {
        self.get_json::<SolscanTokenMeta>(&format!("/token/meta?address={mint}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_account_payload() {
        let raw = r#"{"lamports": 1500000000, "executable": false, "ownerProgram": "11111111111111111111111111111111"}"#;
        let account: SolscanAccount = serde_json::from_str(raw).unwrap();
        assert_eq!(account.lamports, Some(1_500_000_000));
        assert_eq!(account.executable, Some(false));
        assert!(account.owner_program.is_some());
    }

    #[test]
    fn deserializes_token_holding_with_missing_fields() {
        let raw = r#"{"mintAddress": "So11111111111111111111111111111111111111112"}"#;
        let holding: SolscanTokenHolding = serde_json::from_str(raw).unwrap();
        assert!(holding.mint_address.is_some());
        assert!(holding.token_amount.is_none());
        assert!(holding.token_symbol.is_none());
        assert!(holding.token_price.is_none());
    }

    #[test]
    fn transaction_accepts_tx_hash_alias() {
        let raw = r#"{"txHash": "abc123", "blockTime": 1700000000}"#;
        let tx: SolscanTransaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.signature.as_deref(), Some("abc123"));
        assert_eq!(tx.block_time, Some(1_700_000_000));
    }
}
