// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature login.
//!
//! The wallet signs `"Sign in to Memo Bot as {user_id}\nTimestamp: {ms}"`
//! with its ed25519 key. A signature older than [`LOGIN_FRESHNESS`] is
//! rejected, as is one timestamped further than that into the future.

use std::str::FromStr;
use std::time::Duration;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::blockchain::Pubkey;

pub const LOGIN_FRESHNESS: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Signature expired")]
    Expired,

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Malformed signature")]
    MalformedSignature,

    #[error("Signature does not match")]
    SignatureMismatch,
}

pub fn login_message(user_id: &str, timestamp_ms: i64) -> String {
    format!("Sign in to Memo Bot as {user_id}\nTimestamp: {timestamp_ms}")
}

/// Check that `wallet` signed the login message for `user_id` at
/// `timestamp_ms`, relative to `now_ms`.
pub fn verify_login(
    user_id: &str,
    wallet: &str,
    signature: &[u8],
    timestamp_ms: i64,
    now_ms: i64,
) -> Result<(), LoginError> {
    let window = LOGIN_FRESHNESS.as_millis() as i64;
    if now_ms.saturating_sub(timestamp_ms).abs() > window {
        return Err(LoginError::Expired);
    }

    let pubkey = Pubkey::from_str(wallet).map_err(|_| LoginError::InvalidAddress(wallet.to_string()))?;
    let key = VerifyingKey::from_bytes(pubkey.as_bytes())
        .map_err(|_| LoginError::InvalidAddress(wallet.to_string()))?;
    let signature = Signature::from_slice(signature).map_err(|_| LoginError::MalformedSignature)?;

    key.verify(login_message(user_id, timestamp_ms).as_bytes(), &signature)
        .map_err(|_| LoginError::SignatureMismatch)
}
