// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Rules Resolution
//!
//! Community rules live in memo transactions sent by the community address.
//! Resolution is tiered:
//!
//! 1. In-process [`RulesCache`] (fresh within its TTL)
//! 2. Newest-first scan of the address's recent history
//! 3. Last known good value in the persistent store
//!
//! A successful chain read writes through to both caches. A failed or empty
//! scan serves the persisted value so a community never loses its rules to
//! an RPC outage.

use std::sync::Arc;

use crate::blockchain::{ChainError, ChainReader, ParsedTransaction, RetryPolicy, ScanPolicy};
use crate::storage::{rules_cache_key, KeyValueStore};

use super::cache::RulesCache;
use super::types::{CommunityRules, MemoPayload};

/// Resolves the governing rules of a community address.
pub struct RulesResolver {
    chain: Arc<dyn ChainReader>,
    store: Arc<dyn KeyValueStore>,
    cache: Arc<RulesCache>,
    retry: RetryPolicy,
    scan: ScanPolicy,
}

impl RulesResolver {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        store: Arc<dyn KeyValueStore>,
        cache: Arc<RulesCache>,
        retry: RetryPolicy,
        scan: ScanPolicy,
    ) -> Self {
        Self {
            chain,
            store,
            cache,
            retry,
            scan,
        }
    }

    pub fn cache(&self) -> &RulesCache {
        &self.cache
    }

    /// Current rules for `address`, or `None` if none were ever observed.
    ///
    /// Never fails: chain and storage errors degrade to the next tier.
    pub async fn get_rules(&self, address: &str) -> Option<CommunityRules> {
        if let Some(rules) = self.cache.get(address) {
            tracing::debug!(community = %address, "Rules served from memory");
            return Some(rules);
        }

        match self.fetch_from_chain(address).await {
            Ok(Some(rules)) => {
                self.cache.put(address, rules.clone());
                self.persist(address, &rules).await;
                return Some(rules);
            }
            Ok(None) => {
                tracing::debug!(community = %address, "No rules memo in recent history");
            }
            Err(e) => {
                tracing::warn!(community = %address, error = %e, "Rules scan failed");
            }
        }

        let rules = self.load_persisted(address).await?;
        tracing::warn!(community = %address, "Serving last known rules from persistent store");
        self.cache.put(address, rules.clone());
        Some(rules)
    }

    /// Scan the newest signatures of `address` for the first rules memo.
    ///
    /// Only listing failures are errors; a transaction that cannot be fetched
    /// after retries is skipped.
    pub async fn fetch_from_chain(&self, address: &str) -> Result<Option<CommunityRules>, ChainError> {
        let limit = self.scan.signature_limit;
        let signatures = self
            .retry
            .execute(|| self.chain.signatures_for_address(address, limit))
            .await?;
        let signatures: Vec<String> = signatures.into_iter().map(|s| s.signature).collect();

        let found = self
            .scan
            .scan(
                &signatures,
                |signature: String| async move {
                    let fetched = self
                        .retry
                        .execute(|| self.chain.parsed_transaction(&signature))
                        .await;
                    (signature, fetched)
                },
                |_, (signature, fetched)| match fetched {
                    Ok(Some(tx)) => rules_in_transaction(&tx, address),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!(signature = %signature, error = %e, "Skipping unreadable transaction");
                        None
                    }
                },
            )
            .await;

        Ok(found)
    }

    async fn persist(&self, address: &str, rules: &CommunityRules) {
        let value = match serde_json::to_string(rules) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(community = %address, error = %e, "Failed to encode rules");
                return;
            }
        };
        if let Err(e) = self.store.set(&rules_cache_key(address), &value, None).await {
            tracing::warn!(community = %address, error = %e, "Failed to persist rules");
        }
    }

    async fn load_persisted(&self, address: &str) -> Option<CommunityRules> {
        let raw = match self.store.get(&rules_cache_key(address)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(community = %address, error = %e, "Persistent rules lookup failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(rules) => Some(rules),
            Err(e) => {
                tracing::warn!(community = %address, error = %e, "Discarding corrupt persisted rules");
                None
            }
        }
    }
}

/// First rules payload among the top-level memo instructions of `tx`, with
/// the fee payer attached as creator.
fn rules_in_transaction(tx: &ParsedTransaction, address: &str) -> Option<CommunityRules> {
    if tx.is_failed() {
        return None;
    }
    tx.transaction
        .message
        .instructions
        .iter()
        .filter_map(|ix| ix.memo_text())
        .find_map(|text| match MemoPayload::classify(&text).into_rules(address) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::debug!(community = %address, error = %e, "Ignoring undecryptable memo");
                None
            }
        })
        .map(|mut rules| {
            rules.creator = tx.signer().map(str::to_string);
            rules
        })
}
