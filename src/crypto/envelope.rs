// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compress-then-encrypt envelopes for on-chain memos.
//!
//! ## Wire format
//!
//! ```text
//! {"encrypted": "<base64 ciphertext>", "nonce": "<base64 24-byte nonce>"}
//! ```
//!
//! The ciphertext is a NaCl `secretbox` (XSalsa20-Poly1305, tag first) over the
//! gzip-compressed plaintext. The symmetric key is the first 32 bytes of
//! SHA-512 over the recipient identifier (a community or wallet address), so
//! anyone who knows the address can read the payload; the envelope keeps
//! memos out of casual explorer views, it is not access control.
//!
//! The asymmetric variant uses a Curve25519 `box` between a sender secret key
//! and a recipient public key with the same compress-then-encrypt order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use crypto_secretbox::aead::generic_array::GenericArray;
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::XSalsa20Poly1305;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use super::compression::{compress, decompress};
use super::CryptoError;

/// Nonce length shared by `secretbox` and `box`.
pub const NONCE_LENGTH: usize = 24;

/// Symmetric key length.
pub const KEY_LENGTH: usize = 32;

/// Prefix of every human-readable decryption failure.
pub const DECRYPTION_FAILED_PREFIX: &str = "[Decryption failed";

/// Encrypted memo body as it appears on-chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub encrypted: EnvelopeBytes,
    pub nonce: EnvelopeBytes,
}

/// Envelope fields are base64 strings; older writers emitted raw byte arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeBytes {
    Base64(String),
    Raw(Vec<u8>),
}

impl EnvelopeBytes {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        match self {
            EnvelopeBytes::Base64(s) => STANDARD
                .decode(s.trim())
                .map_err(|e| CryptoError::InvalidEncoding(e.to_string())),
            EnvelopeBytes::Raw(bytes) => Ok(bytes.clone()),
        }
    }
}

impl EncryptedEnvelope {
    /// Decrypt with the key derived from `recipient_id`.
    pub fn open(&self, recipient_id: &str) -> Result<String, CryptoError> {
        let ciphertext = self.encrypted.to_bytes()?;
        let nonce = self.nonce.to_bytes()?;
        open_from_chain(&ciphertext, &nonce, recipient_id)
    }
}

/// Derive the 32-byte symmetric key for `id`: SHA-512, truncated.
pub fn derive_key(id: &str) -> Result<[u8; KEY_LENGTH], CryptoError> {
    if id.is_empty() {
        return Err(CryptoError::EmptyRecipient);
    }
    let digest = Sha512::digest(id.as_bytes());
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&digest[..KEY_LENGTH]);
    Ok(key)
}

/// Compress and encrypt `plaintext` for `recipient_id` with a random nonce.
pub fn encrypt_for_chain(plaintext: &str, recipient_id: &str) -> Result<EncryptedEnvelope, CryptoError> {
    let key = derive_key(recipient_id)?;
    let compressed = compress(plaintext)?;
    let nonce: [u8; NONCE_LENGTH] = rand::random();

    let cipher = XSalsa20Poly1305::new_from_slice(&key).map_err(|_| CryptoError::InvalidKey)?;
    let sealed = cipher
        .encrypt(GenericArray::from_slice(&nonce), compressed.as_slice())
        .map_err(|_| CryptoError::Encryption)?;

    Ok(EncryptedEnvelope {
        encrypted: EnvelopeBytes::Base64(STANDARD.encode(sealed)),
        nonce: EnvelopeBytes::Base64(STANDARD.encode(nonce)),
    })
}

/// Authenticate, decrypt and decompress an on-chain payload.
pub fn open_from_chain(ciphertext: &[u8], nonce: &[u8], recipient_id: &str) -> Result<String, CryptoError> {
    if nonce.len() != NONCE_LENGTH {
        return Err(CryptoError::InvalidNonceLength(nonce.len()));
    }
    let key = derive_key(recipient_id)?;

    let cipher = XSalsa20Poly1305::new_from_slice(&key).map_err(|_| CryptoError::InvalidKey)?;
    let opened = cipher
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    decompress(&opened)
}

/// Like [`open_from_chain`], but never fails: errors become a bracketed
/// `[Decryption failed: ...]` string that callers can render as-is.
pub fn decrypt_from_chain(ciphertext: &[u8], nonce: &[u8], recipient_id: &str) -> String {
    match open_from_chain(ciphertext, nonce, recipient_id) {
        Ok(text) => text,
        Err(e) => format!("{DECRYPTION_FAILED_PREFIX}: {e}]"),
    }
}

/// Curve25519 key pair from a 32-byte seed (e.g. the head of a wallet
/// signature). Returns `(secret, public)`.
pub fn keypair_from_seed(seed: &[u8]) -> Result<([u8; KEY_LENGTH], [u8; KEY_LENGTH]), CryptoError> {
    let head: [u8; KEY_LENGTH] = seed
        .get(..KEY_LENGTH)
        .and_then(|s| s.try_into().ok())
        .ok_or(CryptoError::InvalidKey)?;
    let secret = SecretKey::from(head);
    let public = secret.public_key();
    Ok((secret.to_bytes(), *public.as_bytes()))
}

/// Compress then `box` `plaintext` from `sender_secret` to `recipient_public`.
/// Returns `(ciphertext, nonce)`.
pub fn encrypt_asymmetric(
    plaintext: &str,
    recipient_public: &[u8; KEY_LENGTH],
    sender_secret: &[u8; KEY_LENGTH],
) -> Result<(Vec<u8>, [u8; NONCE_LENGTH]), CryptoError> {
    let compressed = compress(plaintext)?;
    let nonce: [u8; NONCE_LENGTH] = rand::random();

    let salsa_box = SalsaBox::new(
        &PublicKey::from(*recipient_public),
        &SecretKey::from(*sender_secret),
    );
    let sealed = salsa_box
        .encrypt(GenericArray::from_slice(&nonce), compressed.as_slice())
        .map_err(|_| CryptoError::Encryption)?;

    Ok((sealed, nonce))
}

/// Open a `box` from `sender_public` with `recipient_secret`, then decompress.
pub fn decrypt_asymmetric(
    ciphertext: &[u8],
    nonce: &[u8],
    sender_public: &[u8; KEY_LENGTH],
    recipient_secret: &[u8; KEY_LENGTH],
) -> Result<String, CryptoError> {
    if nonce.len() != NONCE_LENGTH {
        return Err(CryptoError::InvalidNonceLength(nonce.len()));
    }

    let salsa_box = SalsaBox::new(
        &PublicKey::from(*sender_public),
        &SecretKey::from(*recipient_secret),
    );
    let opened = salsa_box
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    decompress(&opened)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMUNITY: &str = "GTkXcd3Pg9TwoeKShhAGD9qdUJ3J9fbP8sjRFZhbv54u";

    #[test]
    fn key_derivation_is_deterministic_and_address_specific() {
        let a = derive_key(COMMUNITY).unwrap();
        assert_eq!(a, derive_key(COMMUNITY).unwrap());
        assert_ne!(a, derive_key("SomeOtherAddress").unwrap());
        assert!(matches!(derive_key(""), Err(CryptoError::EmptyRecipient)));
    }

    #[test]
    fn envelope_opens_with_community_key() {
        let rules = r#"{"type":"COMMUNITY_RULES","tokenMint":"M","minTokenBalance":1000}"#;
        let envelope = encrypt_for_chain(rules, COMMUNITY).unwrap();
        assert_eq!(envelope.open(COMMUNITY).unwrap(), rules);
    }

    #[test]
    fn envelope_json_uses_base64_fields() {
        let envelope = encrypt_for_chain("hello", COMMUNITY).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json["encrypted"].is_string());
        assert_eq!(STANDARD.decode(json["nonce"].as_str().unwrap()).unwrap().len(), NONCE_LENGTH);

        let back: EncryptedEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back.open(COMMUNITY).unwrap(), "hello");
    }

    #[test]
    fn wrong_key_yields_sentinel_not_panic() {
        let envelope = encrypt_for_chain("secret rules", COMMUNITY).unwrap();
        let ciphertext = envelope.encrypted.to_bytes().unwrap();
        let nonce = envelope.nonce.to_bytes().unwrap();

        let text = decrypt_from_chain(&ciphertext, &nonce, "WrongAddress");
        assert!(text.starts_with(DECRYPTION_FAILED_PREFIX));
        assert!(text.contains("Authentication failed"));
    }

    #[test]
    fn short_nonce_yields_sentinel() {
        let text = decrypt_from_chain(b"abc", &[0u8; 12], COMMUNITY);
        assert!(text.starts_with(DECRYPTION_FAILED_PREFIX));
        assert!(text.contains("nonce"));
    }

    #[test]
    fn raw_byte_array_fields_are_accepted() {
        let envelope = encrypt_for_chain("legacy", COMMUNITY).unwrap();
        let legacy = EncryptedEnvelope {
            encrypted: EnvelopeBytes::Raw(envelope.encrypted.to_bytes().unwrap()),
            nonce: EnvelopeBytes::Raw(envelope.nonce.to_bytes().unwrap()),
        };
        let json = serde_json::to_string(&legacy).unwrap();
        let back: EncryptedEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.open(COMMUNITY).unwrap(), "legacy");
    }

    #[test]
    fn asymmetric_box_round_trips_between_parties() {
        let (alice_secret, alice_public) = keypair_from_seed(&[1u8; 64]).unwrap();
        let (bob_secret, bob_public) = keypair_from_seed(&[2u8; 64]).unwrap();

        let (sealed, nonce) = encrypt_asymmetric("gm", &bob_public, &alice_secret).unwrap();
        let opened = decrypt_asymmetric(&sealed, &nonce, &alice_public, &bob_secret).unwrap();
        assert_eq!(opened, "gm");

        let (_, eve_public) = keypair_from_seed(&[3u8; 32]).unwrap();
        assert!(matches!(
            decrypt_asymmetric(&sealed, &nonce, &eve_public, &bob_secret),
            Err(CryptoError::AuthenticationFailed)
        ));
    }
}
