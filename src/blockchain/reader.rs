// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger read capability consumed by the engine.
//!
//! Any client that can answer these four queries is substitutable; the
//! production implementation is [`SolanaRpcClient`](super::SolanaRpcClient).

use async_trait::async_trait;

use super::types::{ParsedTransaction, SignatureInfo, TokenAccountBalance, TokenAmount};

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Up to `limit` most recent signatures touching `address`, newest first.
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ChainError>;

    /// A parsed transaction, or `None` when the ledger no longer has it.
    async fn parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, ChainError>;

    /// Every token account `owner` holds for `mint`.
    async fn token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<TokenAccountBalance>, ChainError>;

    async fn token_supply(&self, mint: &str) -> Result<TokenAmount, ChainError>;
}

/// Errors that can occur during ledger reads.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rate limited by RPC provider")]
    RateLimited,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}
