// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Balances and Supply
//!
//! Every read here is fail-closed: a lookup that still fails after retries
//! yields `None` ("undetermined"), never zero. An aggregate over several
//! wallets is `None` as soon as any single wallet is, so a transient RPC
//! failure can never shrink a claimant's holdings.

use std::collections::HashSet;
use std::sync::Arc;

use crate::blockchain::{ChainReader, RetryPolicy};

/// Balance and supply reader over the chain-read capability.
pub struct TokenLedger {
    chain: Arc<dyn ChainReader>,
    retry: RetryPolicy,
}

impl TokenLedger {
    pub fn new(chain: Arc<dyn ChainReader>, retry: RetryPolicy) -> Self {
        Self { chain, retry }
    }

    /// Sum of `mint` held across all of `wallet`'s token accounts.
    pub async fn token_balance(&self, wallet: &str, mint: &str) -> Option<f64> {
        let accounts = match self
            .retry
            .execute(|| self.chain.token_accounts_by_owner(wallet, mint))
            .await
        {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!(wallet = %wallet, mint = %mint, error = %e, "Token balance undetermined");
                return None;
            }
        };

        let mut total = 0.0;
        for account in &accounts {
            match account.amount.ui_value() {
                Some(v) => total += v,
                None => {
                    tracing::warn!(account = %account.address, "Unreadable token amount");
                    return None;
                }
            }
        }
        Some(total)
    }

    /// Sum of `mint` across the de-duplicated `wallets`.
    ///
    /// Returns `None` if any single lookup is undetermined; an empty wallet
    /// list holds nothing.
    pub async fn aggregated_token_balance(&self, wallets: &[String], mint: &str) -> Option<f64> {
        let mut seen = HashSet::new();
        let mut total = 0.0;
        for wallet in wallets.iter().filter(|w| seen.insert(w.as_str())) {
            total += self.token_balance(wallet, mint).await?;
        }
        Some(total)
    }

    /// Circulating supply of `mint` in UI units.
    pub async fn token_supply(&self, mint: &str) -> Option<f64> {
        match self.retry.execute(|| self.chain.token_supply(mint)).await {
            Ok(amount) => {
                let supply = amount.ui_value();
                if supply.is_none() {
                    tracing::warn!(mint = %mint, "Unreadable token supply");
                }
                supply
            }
            Err(e) => {
                tracing::warn!(mint = %mint, error = %e, "Token supply undetermined");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChain;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn ledger(chain: Arc<FakeChain>) -> TokenLedger {
        TokenLedger::new(chain, RetryPolicy::new(3, Duration::from_millis(10)))
    }

    #[tokio::test(start_paused = true)]
    async fn sums_all_token_accounts_of_a_wallet() {
        let chain = Arc::new(FakeChain::new());
        chain.set_holding("W1", "M", &[250.0, 350.0]);

        assert_eq!(ledger(chain).token_balance("W1", "M").await, Some(600.0));
    }

    #[tokio::test(start_paused = true)]
    async fn wallet_without_accounts_holds_zero() {
        let chain = Arc::new(FakeChain::new());
        assert_eq!(ledger(chain).token_balance("W1", "M").await, Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn aggregates_across_wallets() {
        let chain = Arc::new(FakeChain::new());
        chain.set_holding("W1", "M", &[600.0]);
        chain.set_holding("W2", "M", &[500.0]);

        let wallets = vec!["W1".to_string(), "W2".to_string()];
        let total = ledger(chain).aggregated_token_balance(&wallets, "M").await;
        assert_eq!(total, Some(1100.0));
        assert!(total.unwrap() >= 1000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failed_wallet_fails_the_aggregate() {
        let chain = Arc::new(FakeChain::new());
        chain.set_holding("A", "M", &[5_000.0]);
        chain.fail_owner("B");

        let wallets = vec!["A".to_string(), "B".to_string()];
        assert_eq!(ledger(chain.clone()).aggregated_token_balance(&wallets, "M").await, None);
        // A once, B three times
        assert_eq!(chain.token_account_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_wallets_are_counted_once() {
        let chain = Arc::new(FakeChain::new());
        chain.set_holding("W1", "M", &[600.0]);

        let wallets = vec!["W1".to_string(), "W1".to_string()];
        assert_eq!(ledger(chain.clone()).aggregated_token_balance(&wallets, "M").await, Some(600.0));
        assert_eq!(chain.token_account_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_wallets_aggregate_to_zero() {
        let chain = Arc::new(FakeChain::new());
        assert_eq!(ledger(chain).aggregated_token_balance(&[], "M").await, Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn supply_is_fail_closed() {
        let chain = Arc::new(FakeChain::new());
        chain.set_supply("M", 1_000_000_000.0);
        let ledger = ledger(chain);

        assert_eq!(ledger.token_supply("M").await, Some(1_000_000_000.0));
        assert_eq!(ledger.token_supply("Unknown").await, None);
    }
}
