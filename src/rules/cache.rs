// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for the memory tier of rules resolution.
//!
//! Owned by whichever process composes the resolver and injected into it.
//! Concurrent writers for the same address converge on the same value, so
//! last-write-wins is sufficient.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use super::types::CommunityRules;

/// Default memory-tier TTL.
pub const DEFAULT_RULES_TTL: Duration = Duration::from_secs(60);

/// Default number of community addresses kept in memory.
pub const DEFAULT_RULES_CAPACITY: usize = 1024;

/// Cached entry: rules + fetch timestamp.
struct CacheEntry {
    rules: CommunityRules,
    fetched_at: Instant,
}

/// In-process LRU cache of community rules keyed by address.
pub struct RulesCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for RulesCache {
    fn default() -> Self {
        Self::new(DEFAULT_RULES_CAPACITY, DEFAULT_RULES_TTL)
    }
}

impl RulesCache {
    /// Create a new cache with the given capacity and TTL.
    ///
    /// - `capacity`: Max number of community addresses to cache.
    /// - `ttl`: Time-to-live for each cache entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Get fresh cached rules for an address.
    ///
    /// Returns `None` if not cached or expired. Addresses are base58 and
    /// therefore case-sensitive.
    pub fn get(&self, address: &str) -> Option<CommunityRules> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(address) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Some(entry.rules.clone());
            }
            // Expired, drop it
            cache.pop(address);
        }
        None
    }

    /// Store rules for an address, resetting its age.
    pub fn put(&self, address: &str, rules: CommunityRules) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                address.to_string(),
                CacheEntry {
                    rules,
                    fetched_at: Instant::now(),
                },
            );
        }
    }
}
