// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::balances::TokenLedger;
use crate::blockchain::ChainReader;
use crate::config::Config;
use crate::rules::{RulesCache, RulesResolver};
use crate::storage::KeyValueStore;
use crate::verification::{ChallengeStore, TransactionVerifier, VerificationService, WalletRegistry};

/// Shared handles for request handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RulesResolver>,
    pub ledger: Arc<TokenLedger>,
    pub verification: Arc<VerificationService>,
}

impl AppState {
    /// Compose the engine over a chain reader and a persistent store.
    pub fn new(config: &Config, chain: Arc<dyn ChainReader>, store: Arc<dyn KeyValueStore>) -> Self {
        let cache = Arc::new(RulesCache::new(config.rules_cache_capacity, config.rules_cache_ttl));
        let rules = RulesResolver::new(
            chain.clone(),
            store.clone(),
            cache,
            config.retry,
            config.rules_scan,
        );
        let verifier = TransactionVerifier::new(
            chain.clone(),
            config.retry,
            config.verification_scan,
            config.verification_mint.clone(),
            config.verification_mint_decimals,
        );
        let verification = VerificationService::new(
            ChallengeStore::new(store.clone(), config.challenge_ttl),
            WalletRegistry::new(store),
            verifier,
        );

        Self {
            rules: Arc::new(rules),
            ledger: Arc::new(TokenLedger::new(chain, config.retry)),
            verification: Arc::new(verification),
        }
    }
}
