// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified wallets per user.

use std::sync::Arc;

use crate::storage::{user_wallets_key, KeyValueStore, StoreResult};

/// Maps a user id to the wallets they have proven control of, in link order.
pub struct WalletRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl WalletRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn wallets(&self, user_id: &str) -> StoreResult<Vec<String>> {
        match self.store.get(&user_wallets_key(user_id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Link `wallet`; linking twice is a no-op. Returns the updated list.
    pub async fn link(&self, user_id: &str, wallet: &str) -> StoreResult<Vec<String>> {
        let mut wallets = self.wallets(user_id).await?;
        if !wallets.iter().any(|w| w == wallet) {
            wallets.push(wallet.to_string());
            self.save(user_id, &wallets).await?;
            tracing::info!(user_id = %user_id, wallet = %wallet, "Wallet linked");
        }
        Ok(wallets)
    }

    /// Returns whether the wallet was linked.
    pub async fn unlink(&self, user_id: &str, wallet: &str) -> StoreResult<bool> {
        let mut wallets = self.wallets(user_id).await?;
        let before = wallets.len();
        wallets.retain(|w| w != wallet);
        if wallets.len() == before {
            return Ok(false);
        }
        if wallets.is_empty() {
            self.store.delete(&user_wallets_key(user_id)).await?;
        } else {
            self.save(user_id, &wallets).await?;
        }
        tracing::info!(user_id = %user_id, wallet = %wallet, "Wallet unlinked");
        Ok(true)
    }

    async fn save(&self, user_id: &str, wallets: &[String]) -> StoreResult<()> {
        let value = serde_json::to_string(wallets)?;
        self.store.set(&user_wallets_key(user_id), &value, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn link_is_idempotent_and_ordered() {
        let registry = WalletRegistry::new(Arc::new(MemoryStore::new()));
        registry.link("u1", "W2").await.unwrap();
        registry.link("u1", "W1").await.unwrap();
        let wallets = registry.link("u1", "W2").await.unwrap();

        assert_eq!(wallets, vec!["W2".to_string(), "W1".to_string()]);
        assert_eq!(registry.wallets("u1").await.unwrap(), wallets);
        assert!(registry.wallets("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlink_removes_only_that_wallet() {
        let registry = WalletRegistry::new(Arc::new(MemoryStore::new()));
        registry.link("u1", "W1").await.unwrap();
        registry.link("u1", "W2").await.unwrap();

        assert!(registry.unlink("u1", "W1").await.unwrap());
        assert!(!registry.unlink("u1", "W1").await.unwrap());
        assert_eq!(registry.wallets("u1").await.unwrap(), vec!["W2".to_string()]);
    }
}
