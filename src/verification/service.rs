// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge issuance and completion.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::Pubkey;

use super::challenge::{ChallengeStore, VerificationChallenge};
use super::registry::WalletRegistry;
use super::verifier::{TransactionVerifier, VerificationRequest, VerificationResult};
use super::VerificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeMethod {
    /// Send a memo containing the user id.
    #[default]
    Memo,
    /// Self-transfer a unique SOL amount.
    Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    NoPendingChallenge,
    /// Nothing qualifying in the scanned window yet.
    NotFound,
    Verified {
        result: VerificationResult,
        wallets: Vec<String>,
    },
}

pub struct VerificationService {
    challenges: ChallengeStore,
    registry: WalletRegistry,
    verifier: TransactionVerifier,
}

impl VerificationService {
    pub fn new(challenges: ChallengeStore, registry: WalletRegistry, verifier: TransactionVerifier) -> Self {
        Self {
            challenges,
            registry,
            verifier,
        }
    }

    pub fn registry(&self) -> &WalletRegistry {
        &self.registry
    }

    pub async fn start(
        &self,
        user_id: &str,
        wallet: &str,
        method: ChallengeMethod,
    ) -> Result<VerificationChallenge, VerificationError> {
        Pubkey::from_str(wallet)?;
        let challenge = match method {
            ChallengeMethod::Memo => self.challenges.issue_memo(user_id, wallet).await?,
            ChallengeMethod::Amount => self.challenges.issue_amount(user_id, wallet).await?,
        };
        Ok(challenge)
    }

    /// Look for the pending challenge's proof. With a `community`, its history
    /// is scanned; without one, the claimed wallet's own (self-transfer).
    pub async fn complete(
        &self,
        user_id: &str,
        community: Option<&str>,
    ) -> Result<CompletionOutcome, VerificationError> {
        let Some(challenge) = self.challenges.pending(user_id).await? else {
            return Ok(CompletionOutcome::NoPendingChallenge);
        };

        let target = community.unwrap_or(&challenge.wallet);
        if let Some(community) = community {
            Pubkey::from_str(community)?;
        }

        let request = VerificationRequest {
            target: target.to_string(),
            identity_code: user_id.to_string(),
            claimed_wallet: Some(challenge.wallet.clone()),
            expected_amount: challenge.amount.clone(),
        };

        let Some(result) = self.verifier.check_verification(&request).await? else {
            tracing::info!(user_id = %user_id, target_address = %target, "No verification transaction yet");
            return Ok(CompletionOutcome::NotFound);
        };

        let wallets = self.registry.link(user_id, &result.wallet_address).await?;
        self.challenges.consume(user_id).await?;
        Ok(CompletionOutcome::Verified { result, wallets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{ChainError, RetryPolicy, ScanPolicy};
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::testing::{memo_ix, system_transfer_ix, tx_signed_by, FakeChain};
    use crate::verification::DEFAULT_CHALLENGE_TTL;
    use std::sync::Arc;
    use std::time::Duration;

    const MINT: &str = "8ZQme2xv6prRKkKNA4PTn5DSXUTdY6yeoc5yDkm7pump";
    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const COMMUNITY: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

    fn service(chain: Arc<FakeChain>) -> VerificationService {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        VerificationService::new(
            ChallengeStore::new(store.clone(), DEFAULT_CHALLENGE_TTL),
            WalletRegistry::new(store),
            TransactionVerifier::new(
                chain,
                RetryPolicy::new(3, Duration::from_millis(10)),
                ScanPolicy::batched(50, 5, Duration::from_millis(200)),
                MINT,
                6,
            ),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn memo_verification_links_wallet_and_consumes_challenge() {
        let chain = Arc::new(FakeChain::new());
        chain.push_tx(WALLET, "s1", tx_signed_by(WALLET, vec![memo_ix("42")]));
        let service = service(chain);

        service.start("42", WALLET, ChallengeMethod::Memo).await.unwrap();
        let outcome = service.complete("42", None).await.unwrap();

        let CompletionOutcome::Verified { result, wallets } = outcome else {
            panic!("expected verification, got {outcome:?}");
        };
        assert_eq!(result.signature, "s1");
        assert_eq!(wallets, vec![WALLET.to_string()]);
        assert_eq!(
            service.complete("42", None).await.unwrap(),
            CompletionOutcome::NoPendingChallenge
        );
    }

    #[tokio::test(start_paused = true)]
    async fn amount_challenge_matches_exact_self_transfer() {
        let chain = Arc::new(FakeChain::new());
        let service = service(chain.clone());

        let challenge = service.start("7", WALLET, ChallengeMethod::Amount).await.unwrap();
        let amount: f64 = challenge.amount.unwrap().parse().unwrap();
        let lamports = (amount * 1e9).round() as u64;
        chain.push_tx(WALLET, "self", tx_signed_by(WALLET, vec![system_transfer_ix(WALLET, WALLET, lamports)]));

        assert!(matches!(
            service.complete("7", None).await.unwrap(),
            CompletionOutcome::Verified { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn community_mode_scans_the_community_history() {
        let chain = Arc::new(FakeChain::new());
        let service = service(chain.clone());
        service.start("42", WALLET, ChallengeMethod::Memo).await.unwrap();

        assert_eq!(
            service.complete("42", Some(COMMUNITY)).await.unwrap(),
            CompletionOutcome::NotFound
        );

        chain.push_tx(COMMUNITY, "join", tx_signed_by(WALLET, vec![memo_ix("42")]));
        assert!(matches!(
            service.complete("42", Some(COMMUNITY)).await.unwrap(),
            CompletionOutcome::Verified { .. }
        ));
    }

    #[tokio::test]
    async fn invalid_wallet_is_rejected_up_front() {
        let service = service(Arc::new(FakeChain::new()));
        let err = service.start("42", "not-a-wallet", ChallengeMethod::Memo).await.unwrap_err();
        assert!(matches!(err, VerificationError::Chain(ChainError::InvalidAddress(_))));
    }
}
