// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pending verification challenges.
//!
//! A challenge records which wallet a user claims and, for amount
//! verification, the unique amount they were asked to send. One challenge per
//! user; issuing a new one replaces the old.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{pending_verification_key, KeyValueStore, StoreResult};

pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(15 * 60);

/// Base of every verification amount, in SOL.
const AMOUNT_BASE_SOL: f64 = 0.001;
/// Dust added on top of the base, in lamports.
const DUST_RANGE: std::ops::Range<u64> = 1_000..901_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChallenge {
    /// The wallet the user claims to control.
    pub wallet: String,
    /// Exact SOL amount to self-transfer, formatted to 9 decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Unix seconds.
    pub issued_at: i64,
}

/// Unique-looking amount in SOL: `0.001 + dust / 1e9`.
pub fn unique_amount<R: Rng + ?Sized>(rng: &mut R) -> String {
    let dust = rng.gen_range(DUST_RANGE);
    format!("{:.9}", AMOUNT_BASE_SOL + dust as f64 / 1e9)
}

pub struct ChallengeStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ChallengeStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Memo challenge: the user id itself is the identity code.
    pub async fn issue_memo(&self, user_id: &str, wallet: &str) -> StoreResult<VerificationChallenge> {
        self.save(user_id, wallet, None).await
    }

    pub async fn issue_amount(&self, user_id: &str, wallet: &str) -> StoreResult<VerificationChallenge> {
        let amount = unique_amount(&mut rand::thread_rng());
        self.save(user_id, wallet, Some(amount)).await
    }

    pub async fn pending(&self, user_id: &str) -> StoreResult<Option<VerificationChallenge>> {
        match self.store.get(&pending_verification_key(user_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn consume(&self, user_id: &str) -> StoreResult<()> {
        self.store.delete(&pending_verification_key(user_id)).await
    }

    async fn save(
        &self,
        user_id: &str,
        wallet: &str,
        amount: Option<String>,
    ) -> StoreResult<VerificationChallenge> {
        let challenge = VerificationChallenge {
            wallet: wallet.to_string(),
            amount,
            issued_at: Utc::now().timestamp(),
        };
        let value = serde_json::to_string(&challenge)?;
        self.store
            .set(&pending_verification_key(user_id), &value, Some(self.ttl))
            .await?;
        tracing::info!(user_id = %user_id, wallet = %wallet, "Verification challenge issued");
        Ok(challenge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn challenges() -> ChallengeStore {
        ChallengeStore::new(Arc::new(MemoryStore::new()), DEFAULT_CHALLENGE_TTL)
    }

    #[test]
    fn amounts_stay_in_range_with_nine_decimals() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let amount = unique_amount(&mut rng);
            let (_, fraction) = amount.split_once('.').unwrap();
            assert_eq!(fraction.len(), 9);

            let value: f64 = amount.parse().unwrap();
            assert!(value >= 0.001001 - 1e-12, "{amount}");
            assert!(value < 0.001901, "{amount}");
        }
    }

    #[tokio::test]
    async fn memo_challenge_round_trip() {
        let challenges = challenges();
        assert!(challenges.pending("u1").await.unwrap().is_none());

        let issued = challenges.issue_memo("u1", "W").await.unwrap();
        assert!(issued.amount.is_none());
        assert_eq!(challenges.pending("u1").await.unwrap(), Some(issued));

        challenges.consume("u1").await.unwrap();
        assert!(challenges.pending("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_challenge_replaces_the_old_one() {
        let challenges = challenges();
        challenges.issue_memo("u1", "W1").await.unwrap();
        let second = challenges.issue_amount("u1", "W2").await.unwrap();

        let pending = challenges.pending("u1").await.unwrap().unwrap();
        assert_eq!(pending.wallet, "W2");
        assert_eq!(pending.amount, second.amount);
        assert!(pending.amount.is_some());
    }
}
