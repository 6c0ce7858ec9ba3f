// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet ownership proofs from recent ledger history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{
    associated_token_addresses, ChainReader, ParsedTransaction, RetryPolicy, ScanPolicy,
};

use super::matcher::MatchMode;
use super::VerificationError;

/// A request to find proof that a claimant acted on-chain.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    /// Address whose history is scanned: the community address in memo mode,
    /// the claimant's own wallet in self-transfer mode.
    pub target: String,
    pub identity_code: String,
    /// When set, the matching transaction must be signed by this wallet.
    pub claimed_wallet: Option<String>,
    /// Exact amount as a decimal string; switches to amount matching.
    pub expected_amount: Option<String>,
}

/// The transaction that proved ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub wallet_address: String,
    pub signature: String,
}

pub struct TransactionVerifier {
    chain: Arc<dyn ChainReader>,
    retry: RetryPolicy,
    scan: ScanPolicy,
    verification_mint: String,
    mint_decimals: u8,
}

impl TransactionVerifier {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        retry: RetryPolicy,
        scan: ScanPolicy,
        verification_mint: impl Into<String>,
        mint_decimals: u8,
    ) -> Self {
        Self {
            chain,
            retry,
            scan,
            verification_mint: verification_mint.into(),
            mint_decimals,
        }
    }

    /// Match mode for `request`.
    pub fn match_mode(&self, request: &VerificationRequest) -> Result<MatchMode, VerificationError> {
        let Some(expected) = request.expected_amount.as_deref() else {
            return Ok(MatchMode::Memo {
                identity_code: request.identity_code.clone(),
            });
        };
        let expected: f64 = expected
            .trim()
            .parse()
            .map_err(|_| VerificationError::InvalidAmount(expected.to_string()))?;
        if !expected.is_finite() || expected <= 0.0 {
            return Err(VerificationError::InvalidAmount(expected.to_string()));
        }

        let claimant = request.claimed_wallet.as_deref().unwrap_or(&request.target);
        Ok(MatchMode::Amount {
            expected,
            verification_mint: self.verification_mint.clone(),
            mint_decimals: self.mint_decimals,
            claimant_token_accounts: associated_token_addresses(claimant, &self.verification_mint)?,
        })
    }

    /// Scan the target's recent history, newest first, for the earliest-listed
    /// qualifying transaction.
    ///
    /// `Ok(None)` is a definitive negative for the current window. Errors are
    /// reserved for an invalid request or a listing that failed after retries.
    pub async fn check_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<Option<VerificationResult>, VerificationError> {
        let mode = self.match_mode(request)?;
        let limit = self.scan.signature_limit;
        let signatures = self
            .retry
            .execute(|| self.chain.signatures_for_address(&request.target, limit))
            .await?;
        let signatures: Vec<String> = signatures
            .into_iter()
            .filter(|s| s.err.is_none())
            .map(|s| s.signature)
            .collect();

        tracing::debug!(
            target_address = %request.target,
            candidates = signatures.len(),
            "Scanning for verification transaction"
        );

        let found = self
            .scan
            .scan(
                &signatures,
                |signature: String| async move {
                    self.retry
                        .execute(|| self.chain.parsed_transaction(&signature))
                        .await
                },
                |signature, fetched| match fetched {
                    Ok(Some(tx)) if mode.matches_transaction(&tx) => {
                        bind_signer(&tx, signature, request.claimed_wallet.as_deref())
                    }
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(signature = %signature, error = %e, "Skipping unreadable transaction");
                        None
                    }
                },
            )
            .await;

        if let Some(result) = &found {
            tracing::info!(
                wallet = %result.wallet_address,
                signature = %result.signature,
                "Verification transaction found"
            );
        }
        Ok(found)
    }
}

/// Accept a matching transaction only when its signer is the claimed wallet.
fn bind_signer(
    tx: &ParsedTransaction,
    signature: &str,
    claimed_wallet: Option<&str>,
) -> Option<VerificationResult> {
    let signer = tx.signer()?;
    if let Some(claimed) = claimed_wallet {
        if signer != claimed {
            tracing::warn!(
                signature = %signature,
                signer = %signer,
                claimed = %claimed,
                "Matching transaction signed by another wallet"
            );
            return None;
        }
    }
    Some(VerificationResult {
        wallet_address: signer.to_string(),
        signature: signature.to_string(),
    })
}
