// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Key-Value Storage
//!
//! The engine persists three kinds of values through the [`KeyValueStore`]
//! collaborator:
//!
//! ```text
//! rules_cache:{address}      # last known good CommunityRules (no TTL)
//! pending_verification:{id}  # VerificationChallenge (TTL-bound)
//! user_wallets:{id}          # JSON array of linked wallet addresses
//! ```
//!
//! [`KvDatabase`] is the durable redb backend; [`MemoryStore`] keeps
//! everything in-process. Concurrency control is the backend's concern; the
//! engine only issues single-key reads and writes.

pub mod kv_database;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

pub use kv_database::KvDatabase;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single-key string store with optional per-entry expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value`; `ttl = None` keeps it until overwritten or deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Wall-clock expiry in epoch milliseconds, `ttl` from now.
pub(crate) fn expiry_from_now(ttl: Duration) -> i64 {
    Utc::now()
        .timestamp_millis()
        .saturating_add(ttl.as_millis().min(i64::MAX as u128) as i64)
}

pub fn rules_cache_key(address: &str) -> String {
    format!("rules_cache:{address}")
}

pub fn pending_verification_key(user_id: &str) -> String {
    format!("pending_verification:{user_id}")
}

pub fn user_wallets_key(user_id: &str) -> String {
    format!("user_wallets:{user_id}")
}
