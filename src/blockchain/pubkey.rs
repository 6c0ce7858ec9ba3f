// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Base58 public keys and associated token account derivation.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use super::reader::ChainError;
use super::types::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_IDS};

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A 32-byte ledger address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether the bytes decode to a point on the ed25519 curve.
    ///
    /// Program-derived addresses must be off-curve so no private key exists.
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

impl FromStr for Pubkey {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| ChainError::InvalidAddress(format!("{s}: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::InvalidAddress(format!("{s}: expected 32 bytes")))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

/// Find the first off-curve program address for `seeds`, trying bumps 255..=0.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
    for bump in (0..=u8::MAX).rev() {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update([bump]);
        hasher.update(program_id.as_bytes());
        hasher.update(PDA_MARKER);
        let candidate = Pubkey(hasher.finalize().into());
        if !candidate.is_on_curve() {
            return Some((candidate, bump));
        }
    }
    None
}

/// Associated token account of `owner` for `mint` under `token_program`.
pub fn associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<Pubkey, ChainError> {
    let ata_program = Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID)?;
    find_program_address(
        &[owner.as_bytes(), token_program.as_bytes(), mint.as_bytes()],
        &ata_program,
    )
    .map(|(address, _)| address)
    .ok_or_else(|| ChainError::InvalidAddress(format!("no associated token account for {owner}")))
}

/// Associated token accounts for both the classic and Token-2022 programs.
pub fn associated_token_addresses(owner: &str, mint: &str) -> Result<Vec<String>, ChainError> {
    let owner = Pubkey::from_str(owner)?;
    let mint = Pubkey::from_str(mint)?;

    let mut out = Vec::with_capacity(TOKEN_PROGRAM_IDS.len());
    for program in TOKEN_PROGRAM_IDS {
        let program = Pubkey::from_str(program)?;
        out.push(associated_token_address(&owner, &mint, &program)?.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

    #[test]
    fn parses_and_displays_base58() {
        let key = Pubkey::from_str(TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(key.to_string(), TOKEN_PROGRAM_ID);
    }

    #[test]
    fn rejects_wrong_length_and_bad_alphabet() {
        assert!(Pubkey::from_str("abc").is_err());
        assert!(Pubkey::from_str("0OIl").is_err());
    }

    #[test]
    fn well_known_program_ids_are_valid_addresses() {
        for id in [
            ASSOCIATED_TOKEN_PROGRAM_ID,
            TOKEN_PROGRAM_ID,
            TOKEN_2022_PROGRAM_ID,
            crate::blockchain::types::SYSTEM_PROGRAM_ID,
            crate::blockchain::types::MEMO_PROGRAM_ID,
            crate::blockchain::types::LEGACY_MEMO_PROGRAM_ID,
        ] {
            assert!(Pubkey::from_str(id).is_ok(), "{id}");
        }
    }

    #[test]
    fn associated_token_accounts_match_known_addresses() {
        let atas = associated_token_addresses(
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
            "8ZQme2xv6prRKkKNA4PTn5DSXUTdY6yeoc5yDkm7pump",
        )
        .unwrap();
        assert_eq!(
            atas,
            vec![
                "EKzf2Cpa4v3JAGncdnGdv9ELiCNWeuoFMk7CYH3ry8tS".to_string(),
                "12JNvqkD4aBFep79eP88j12EFrgte2vyBz7jT2AHPKrE".to_string(),
            ]
        );
    }

    #[test]
    fn derived_address_is_off_curve_and_deterministic() {
        let owner = Pubkey::new([7u8; 32]);
        let mint = Pubkey::new([9u8; 32]);
        let program = Pubkey::from_str(TOKEN_PROGRAM_ID).unwrap();

        let a = associated_token_address(&owner, &mint, &program).unwrap();
        let b = associated_token_address(&owner, &mint, &program).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_on_curve());
    }

    #[test]
    fn token_program_variants_derive_distinct_accounts() {
        let owner = Pubkey::new([1u8; 32]).to_string();
        let mint = Pubkey::new([2u8; 32]).to_string();
        let atas = associated_token_addresses(&owner, &mint).unwrap();
        assert_eq!(atas.len(), 2);
        assert_ne!(atas[0], atas[1]);
    }
}
