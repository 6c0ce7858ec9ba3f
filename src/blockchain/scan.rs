// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rate-limited, order-preserving scans over signature lists.
//!
//! RPC providers throttle aggressively, so history scans fetch at most
//! `concurrency` transactions at a time and pause `spacing` between batches.
//! Results are visited in the original (newest-first) order regardless of
//! which fetch in a batch finished first.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

/// Default number of signatures examined per scan.
pub const DEFAULT_SIGNATURE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// How many recent signatures to list.
    pub signature_limit: usize,
    /// Fetches in flight per batch.
    pub concurrency: usize,
    /// Pause between consecutive batches.
    pub spacing: Duration,
}

impl ScanPolicy {
    /// One fetch at a time, `spacing` apart.
    pub fn sequential(signature_limit: usize, spacing: Duration) -> Self {
        Self {
            signature_limit,
            concurrency: 1,
            spacing,
        }
    }

    pub fn batched(signature_limit: usize, concurrency: usize, spacing: Duration) -> Self {
        Self {
            signature_limit,
            concurrency: concurrency.max(1),
            spacing,
        }
    }

    /// Default rules scan: sequential, 150ms apart.
    pub fn rules_default() -> Self {
        Self::sequential(DEFAULT_SIGNATURE_LIMIT, Duration::from_millis(150))
    }

    /// Default verification scan: batches of 5, 200ms apart.
    pub fn verification_default() -> Self {
        Self::batched(DEFAULT_SIGNATURE_LIMIT, 5, Duration::from_millis(200))
    }

    /// Fetch `items` batch by batch and hand each result to `visit` in list
    /// order. Stops at the first `Some` returned by `visit`.
    pub async fn scan<I, T, R, F, Fut, V>(&self, items: &[I], fetch: F, mut visit: V) -> Option<R>
    where
        I: Clone,
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
        V: FnMut(&I, T) -> Option<R>,
    {
        for (index, batch) in items.chunks(self.concurrency.max(1)).enumerate() {
            if index > 0 && !self.spacing.is_zero() {
                tokio::time::sleep(self.spacing).await;
            }

            let results = join_all(batch.iter().cloned().map(&fetch)).await;
            for (item, result) in batch.iter().zip(results) {
                if let Some(found) = visit(item, result) {
                    return Some(found);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn visits_in_list_order_even_when_later_fetches_finish_first() {
        let policy = ScanPolicy::batched(10, 3, Duration::ZERO);
        let items: Vec<u64> = vec![30, 20, 10];
        let visited = Mutex::new(Vec::new());

        let found: Option<u64> = policy
            .scan(
                &items,
                |delay| async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    delay
                },
                |item, result| {
                    visited.lock().unwrap().push(*item);
                    (result <= 20).then_some(result)
                },
            )
            .await;

        // 10 finished first, but 20 is earlier in the list.
        assert_eq!(found, Some(20));
        assert_eq!(*visited.lock().unwrap(), vec![30, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_matching_batch() {
        let policy = ScanPolicy::batched(10, 2, Duration::from_millis(200));
        let items: Vec<usize> = (0..10).collect();
        let fetched = AtomicUsize::new(0);

        let found = policy
            .scan(
                &items,
                |i| {
                    fetched.fetch_add(1, Ordering::SeqCst);
                    async move { i }
                },
                |_, i| (i == 3).then_some(i),
            )
            .await;

        assert_eq!(found, Some(3));
        assert_eq!(fetched.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn spacing_applies_between_batches_only() {
        let policy = ScanPolicy::batched(10, 5, Duration::from_millis(200));
        let items: Vec<usize> = (0..15).collect();
        let started = Instant::now();

        let found: Option<()> = policy.scan(&items, |i| async move { i }, |_, _| None).await;

        assert!(found.is_none());
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(400), "waited {waited:?}");
        assert!(waited < Duration::from_millis(500), "waited {waited:?}");
    }
}
