// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for ledger reads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::reader::{ChainError, ChainReader};
use super::types::*;

/// Commitment level used for every read.
const COMMITMENT: &str = "confirmed";

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Solana JSON-RPC client.
pub struct SolanaRpcClient {
    rpc_url: url::Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{ context, value }` wrapper used by account-style RPC methods.
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct KeyedTokenAccount {
    pubkey: String,
    account: TokenAccountData,
}

#[derive(Deserialize)]
struct TokenAccountData {
    data: ParsedAccountData,
}

#[derive(Deserialize)]
struct ParsedAccountData {
    parsed: ParsedTokenAccount,
}

#[derive(Deserialize)]
struct ParsedTokenAccount {
    info: TokenAccountInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    token_amount: TokenAmount,
}

impl SolanaRpcClient {
    /// Create a new client for the given RPC endpoint.
    pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
        let rpc_url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChainError::Http(e.to_string()))?;

        Ok(Self { rpc_url, client })
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_str()
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChainError::RateLimited);
        }
        if !status.is_success() {
            return Err(ChainError::Http(format!("HTTP {status} from {method}")));
        }

        let payload: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        if let Some(err) = payload.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(payload.result)
    }

    async fn call_required<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| ChainError::Decode(format!("{method} returned no result")))
    }
}

#[async_trait]
impl ChainReader for SolanaRpcClient {
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ChainError> {
        self.call_required(
            "getSignaturesForAddress",
            json!([address, { "limit": limit, "commitment": COMMITMENT }]),
        )
        .await
    }

    async fn parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, ChainError> {
        self.call(
            "getTransaction",
            json!([signature, {
                "encoding": "jsonParsed",
                "maxSupportedTransactionVersion": 0,
                "commitment": COMMITMENT,
            }]),
        )
        .await
    }

    async fn token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<TokenAccountBalance>, ChainError> {
        let accounts: WithContext<Vec<KeyedTokenAccount>> = self
            .call_required(
                "getTokenAccountsByOwner",
                json!([owner, { "mint": mint }, { "encoding": "jsonParsed", "commitment": COMMITMENT }]),
            )
            .await?;

        Ok(accounts
            .value
            .into_iter()
            .map(|a| TokenAccountBalance {
                address: a.pubkey,
                amount: a.account.data.parsed.info.token_amount,
            })
            .collect())
    }

    async fn token_supply(&self, mint: &str) -> Result<TokenAmount, ChainError> {
        let supply: WithContext<TokenAmount> = self
            .call_required("getTokenSupply", json!([mint, { "commitment": COMMITMENT }]))
            .await?;
        Ok(supply.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_rpc_url() {
        assert!(matches!(
            SolanaRpcClient::new("not a url"),
            Err(ChainError::InvalidRpcUrl(_))
        ));
    }

    #[test]
    fn token_accounts_response_decodes() {
        let raw = json!({
            "context": { "slot": 1 },
            "value": [{
                "pubkey": "Ata111",
                "account": {
                    "data": {
                        "program": "spl-token",
                        "parsed": {
                            "type": "account",
                            "info": {
                                "mint": "Mint111",
                                "owner": "Owner111",
                                "tokenAmount": {
                                    "amount": "600000000",
                                    "decimals": 6,
                                    "uiAmount": 600.0,
                                    "uiAmountString": "600"
                                }
                            }
                        }
                    }
                }
            }]
        });

        let decoded: WithContext<Vec<KeyedTokenAccount>> = serde_json::from_value(raw).unwrap();
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value[0].pubkey, "Ata111");
        assert_eq!(
            decoded.value[0].account.data.parsed.info.token_amount.ui_value(),
            Some(600.0)
        );
    }

    #[test]
    fn rpc_error_object_decodes() {
        let raw = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32005, "message": "Node is behind" }
        });
        let decoded: RpcResponse<Value> = serde_json::from_value(raw).unwrap();
        assert!(decoded.result.is_none());
        let err = decoded.error.unwrap();
        assert_eq!(err.code, -32005);
    }
}
