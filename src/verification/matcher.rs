// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Instruction matching for ownership proofs.
//!
//! ## Memo mode
//!
//! Any memo instruction whose text contains the identity code.
//!
//! ## Amount mode
//!
//! - A token `transfer`/`transferChecked` (classic or Token-2022) whose UI
//!   amount is within [`TOKEN_AMOUNT_EPSILON`] of the expected amount. An
//!   explicit `mint` must be the verification mint; without one, the source or
//!   destination must be one of the claimant's associated token accounts.
//! - A System Program `transfer` whose lamports, in SOL, are within
//!   [`SOL_AMOUNT_EPSILON`] of the expected amount.

use serde_json::Value;

use crate::blockchain::{
    ParsedInstruction, ParsedTransaction, TokenAmount, LAMPORTS_PER_SOL, SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_IDS,
};

pub const TOKEN_AMOUNT_EPSILON: f64 = 1e-6;
pub const SOL_AMOUNT_EPSILON: f64 = 1e-8;

/// What a qualifying instruction must look like.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchMode {
    Memo {
        identity_code: String,
    },
    Amount {
        expected: f64,
        verification_mint: String,
        mint_decimals: u8,
        /// Claimant's associated token accounts for the verification mint.
        claimant_token_accounts: Vec<String>,
    },
}

impl MatchMode {
    /// Whether a successful `tx` carries a qualifying instruction, top-level
    /// or inner.
    pub fn matches_transaction(&self, tx: &ParsedTransaction) -> bool {
        !tx.is_failed() && tx.all_instructions().any(|ix| self.matches(ix))
    }

    pub fn matches(&self, ix: &ParsedInstruction) -> bool {
        match self {
            MatchMode::Memo { identity_code } => ix
                .memo_text()
                .is_some_and(|text| text.contains(identity_code.as_str())),
            MatchMode::Amount {
                expected,
                verification_mint,
                mint_decimals,
                claimant_token_accounts,
            } => {
                token_transfer_matches(
                    ix,
                    *expected,
                    verification_mint,
                    *mint_decimals,
                    claimant_token_accounts,
                ) || system_transfer_matches(ix, *expected)
            }
        }
    }
}

fn is_token_program(ix: &ParsedInstruction) -> bool {
    TOKEN_PROGRAM_IDS.contains(&ix.program_id.as_str())
        || matches!(ix.program.as_deref(), Some("spl-token" | "spl-token-2022"))
}

fn token_transfer_matches(
    ix: &ParsedInstruction,
    expected: f64,
    verification_mint: &str,
    mint_decimals: u8,
    claimant_token_accounts: &[String],
) -> bool {
    if !is_token_program(ix) || !matches!(ix.parsed_type(), Some("transfer" | "transferChecked")) {
        return false;
    }
    let Some(info) = ix.parsed_info() else {
        return false;
    };
    let Some(amount) = transfer_ui_amount(info, mint_decimals) else {
        return false;
    };
    if (amount - expected).abs() >= TOKEN_AMOUNT_EPSILON {
        return false;
    }

    match info.get("mint").and_then(Value::as_str) {
        Some(mint) => mint == verification_mint,
        None => ["source", "destination"].iter().any(|field| {
            info.get(*field)
                .and_then(Value::as_str)
                .is_some_and(|account| claimant_token_accounts.iter().any(|a| a == account))
        }),
    }
}

/// `tokenAmount` when present (`transferChecked`), else the raw `amount`
/// scaled by the mint's decimals (`transfer`).
fn transfer_ui_amount(info: &Value, decimals: u8) -> Option<f64> {
    if let Some(token_amount) = info.get("tokenAmount") {
        return serde_json::from_value::<TokenAmount>(token_amount.clone())
            .ok()?
            .ui_value();
    }
    let raw = match info.get("amount")? {
        Value::String(s) => s.parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    Some(raw / 10f64.powi(decimals as i32))
}

fn system_transfer_matches(ix: &ParsedInstruction, expected: f64) -> bool {
    let is_system = ix.program_id == SYSTEM_PROGRAM_ID || ix.program.as_deref() == Some("system");
    if !is_system || ix.parsed_type() != Some("transfer") {
        return false;
    }
    let Some(lamports) = ix
        .parsed_info()
        .and_then(|info| info.get("lamports"))
        .and_then(Value::as_u64)
    else {
        return false;
    };
    (lamports as f64 / LAMPORTS_PER_SOL - expected).abs() < SOL_AMOUNT_EPSILON
}
