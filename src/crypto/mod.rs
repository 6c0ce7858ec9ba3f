// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Memo payload encryption and compression.

pub mod compression;
pub mod envelope;

pub use compression::{compress, decompress};
pub use envelope::{
    decrypt_asymmetric, decrypt_from_chain, derive_key, encrypt_asymmetric, encrypt_for_chain,
    keypair_from_seed, open_from_chain, EncryptedEnvelope, EnvelopeBytes,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("Message must be a non-empty string")]
    EmptyMessage,

    #[error("Invalid recipient ID")]
    EmptyRecipient,

    #[error("Invalid key")]
    InvalidKey,

    #[error("Invalid nonce length: {0}")]
    InvalidNonceLength(usize),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Encryption failed")]
    Encryption,

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Decompression failed: {0}")]
    Decompression(String),
}
