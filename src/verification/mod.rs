// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Verification
//!
//! Proves that a user controls a wallet by finding a transaction they made:
//!
//! - **Memo mode**: a memo containing the user's identity code, sent to the
//!   community address or to the wallet itself.
//! - **Amount mode**: a self-transfer of an exact, unique amount.
//!
//! Either way the matching transaction must be signed by the claimed wallet.
//! Verified wallets are recorded in the [`WalletRegistry`] and feed the
//! aggregate balance. [`login`] offers a signature-based alternative.

pub mod challenge;
pub mod login;
pub mod matcher;
pub mod registry;
pub mod service;
pub mod verifier;

pub use challenge::{ChallengeStore, VerificationChallenge, DEFAULT_CHALLENGE_TTL};
pub use login::{login_message, verify_login, LoginError};
pub use matcher::MatchMode;
pub use registry::WalletRegistry;
pub use service::{ChallengeMethod, CompletionOutcome, VerificationService};
pub use verifier::{TransactionVerifier, VerificationRequest, VerificationResult};

use crate::blockchain::ChainError;
use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Invalid expected amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
