//! Fallback data source: a Solana JSON-RPC endpoint.
//!
//! Issues three strictly sequential calls: raw account info, token accounts
//! owned by the address (filtered by the SPL token program), and transaction
//! signatures. A null account-info value fails the fetch immediately as
//! account-not-found without attempting the remaining calls.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::types::{SourceError, SIGNATURE_FETCH_LIMIT};

const SERVICE: &str = "rpc";

/// SPL token program id used to filter token accounts by owner.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Wrapper for responses of the `{ context, value }` form.
#[derive(Debug, Deserialize)]
struct RpcValue<T> {
    value: T,
}

/// Raw account info as returned by `getAccountInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcAccountInfo {
    #[serde(default)]
    pub lamports: u64,
    #[serde(default)]
    pub executable: bool,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcKeyedTokenAccount {
    pub pubkey: String,
    pub account: RpcTokenAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcTokenAccount {
    pub data: RpcTokenAccountData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcTokenAccountData {
    pub parsed: RpcParsedTokenData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcParsedTokenData {
    pub info: RpcTokenInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTokenInfo {
    pub mint: String,
    pub token_amount: Option<RpcTokenAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTokenAmount {
    #[serde(default)]
    pub amount: String,
    pub decimals: Option<u8>,
    pub ui_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSignature {
    pub signature: String,
    pub block_time: Option<i64>,
}

/// Raw payloads from one sequential wallet fetch, not yet normalized.
#[derive(Debug, Clone)]
pub struct RpcBundle {
    pub account: RpcAccountInfo,
    pub token_accounts: Vec<RpcKeyedTokenAccount>,
    pub signatures: Vec<RpcSignature>,
}

/// Client for a Solana JSON-RPC endpoint.
pub struct RpcFallbackClient {
    http: Client,
    endpoint: String,
}

impl RpcFallbackClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
        id: u32,
    ) -> Result<T, SourceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
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

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::malformed(SERVICE, e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(SourceError::Rpc {
                service: SERVICE,
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| SourceError::malformed(SERVICE, format!("{method} returned no result")))
    }

    /// Fetch account info, token accounts and signatures for a wallet
    /// address. Calls run sequentially; a missing account aborts the fetch.
    pub async fn fetch_wallet(&self, address: &str) -> Result<RpcBundle, SourceError> {
        debug!(address, "fetching wallet data from rpc fallback");

        let account: RpcValue<Option<RpcAccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([address, { "encoding": "base64" }]),
                1,
            )
            .await?;
        let account = account.value.ok_or(SourceError::AccountNotFound)?;

        let token_accounts: RpcValue<Vec<RpcKeyedTokenAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    address,
                    { "programId": TOKEN_PROGRAM_ID },
                    { "encoding": "jsonParsed" }
                ]),
                2,
            )
            .await?;

        let signatures: Vec<RpcSignature> = self
            .call(
                "getSignaturesForAddress",
                json!([address, { "limit": SIGNATURE_FETCH_LIMIT }]),
                3,
            )
            .await?;

        Ok(RpcBundle {
            account,
            token_accounts: token_accounts.value,
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_parsed_token_account() {
        let raw = r#"{
            "pubkey": "FakePubkey11111111111111111111111111111111",
            "account": {
                "data": {
                    "parsed": {
                        "info": {
                            "mint": "So11111111111111111111111111111111111111112",
                            "tokenAmount": {
                                "amount": "2500000",
                                "decimals": 6,
                                "uiAmount": 2.5
                            }
                        }
                    }
                }
            }
        }"#;
        let keyed: RpcKeyedTokenAccount = serde_json::from_str(raw).unwrap();
        let info = keyed.account.data.parsed.info;
        assert_eq!(info.mint, "So11111111111111111111111111111111111111112");
        let amount = info.token_amount.unwrap();
        assert_eq!(amount.amount, "2500000");
        assert_eq!(amount.decimals, Some(6));
        assert_eq!(amount.ui_amount, Some(2.5));
    }

    #[test]
    fn deserializes_signature_with_null_block_time() {
        let raw = r#"{"signature": "sig1", "blockTime": null}"#;
        let sig: RpcSignature = serde_json::from_str(raw).unwrap();
        assert_eq!(sig.signature, "sig1");
        assert!(sig.block_time.is_none());
    }

    #[test]
    fn envelope_surfaces_rpc_error() {
        let raw = r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param"}}"#;
        let envelope: RpcEnvelope<serde_json::Value> = serde_json::from_str(raw).unwrap();
        let err = envelope.error.unwrap();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Invalid param");
    }
}
