// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and constants.
//!
//! The transaction shapes mirror the `jsonParsed` encoding returned by the
//! ledger's JSON-RPC API. Only the fields the engine reads are modelled.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current SPL Memo program.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Legacy Memo program address still referenced by older clients.
pub const LEGACY_MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcQb";

/// Both historical Memo program addresses.
pub const MEMO_PROGRAM_IDS: [&str; 2] = [MEMO_PROGRAM_ID, LEGACY_MEMO_PROGRAM_ID];

pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Classic SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 (token extensions) program.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Both token program variants a verification transfer may use.
pub const TOKEN_PROGRAM_IDS: [&str; 2] = [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID];

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Public mainnet-beta JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// One entry of `getSignaturesForAddress`, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<Value>,
}

/// A transaction fetched with `jsonParsed` encoding.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructions>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructions {
    pub index: u32,
    #[serde(default)]
    pub instructions: Vec<ParsedInstruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: TransactionMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    #[serde(default)]
    pub account_keys: Vec<AccountKey>,
    #[serde(default)]
    pub instructions: Vec<ParsedInstruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountKey {
    pub pubkey: String,
    #[serde(default)]
    pub signer: bool,
    #[serde(default)]
    pub writable: bool,
}

/// An instruction in either fully parsed or partially decoded form.
///
/// Parsed instructions carry `program` and `parsed`; unknown programs carry
/// raw `data` and `accounts` instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    #[serde(default)]
    pub program: Option<String>,
    pub program_id: String,
    #[serde(default)]
    pub parsed: Option<Value>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub accounts: Option<Vec<String>>,
}

impl ParsedInstruction {
    /// `parsed.type`, e.g. `"transfer"` or `"transferChecked"`.
    pub fn parsed_type(&self) -> Option<&str> {
        self.parsed.as_ref()?.get("type")?.as_str()
    }

    /// `parsed.info` object.
    pub fn parsed_info(&self) -> Option<&Value> {
        self.parsed.as_ref()?.get("info")
    }

    pub fn is_memo(&self) -> bool {
        MEMO_PROGRAM_IDS.contains(&self.program_id.as_str())
            || self.program.as_deref() == Some("spl-memo")
    }

    /// Memo text: the parsed string, else the raw instruction data as UTF-8
    /// decoded from base64, falling back to base58. `None` for non-memo
    /// instructions.
    pub fn memo_text(&self) -> Option<String> {
        if !self.is_memo() {
            return None;
        }
        if let Some(text) = self.parsed.as_ref().and_then(Value::as_str) {
            return Some(text.to_string());
        }
        let data = self.data.as_deref()?;
        STANDARD
            .decode(data)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .or_else(|| {
                let bytes = bs58::decode(data).into_vec().ok()?;
                String::from_utf8(bytes).ok()
            })
    }
}

impl ParsedTransaction {
    /// Whether the transaction failed on-chain (or carries no status at all).
    pub fn is_failed(&self) -> bool {
        match &self.meta {
            Some(meta) => meta.err.is_some(),
            None => true,
        }
    }

    /// First signer in the account list; that is the fee payer.
    pub fn signer(&self) -> Option<&str> {
        let keys = &self.transaction.message.account_keys;
        keys.iter()
            .find(|k| k.signer)
            .or_else(|| keys.first())
            .map(|k| k.pubkey.as_str())
    }

    /// Top-level instructions followed by every inner instruction.
    pub fn all_instructions(&self) -> impl Iterator<Item = &ParsedInstruction> {
        let inner = self
            .meta
            .as_ref()
            .and_then(|m| m.inner_instructions.as_ref())
            .into_iter()
            .flatten()
            .flat_map(|group| group.instructions.iter());
        self.transaction.message.instructions.iter().chain(inner)
    }
}

/// Token amount as reported by the ledger (`uiTokenAmount`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount: Option<f64>,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl TokenAmount {
    /// Human-denominated value: `uiAmount`, else `uiAmountString`, else the raw
    /// amount scaled by `decimals`.
    pub fn ui_value(&self) -> Option<f64> {
        if let Some(v) = self.ui_amount {
            return Some(v);
        }
        if let Some(v) = self.ui_amount_string.as_deref().and_then(|s| s.parse().ok()) {
            return Some(v);
        }
        let raw: f64 = self.amount.parse().ok()?;
        Some(raw / 10f64.powi(self.decimals as i32))
    }
}

/// One token account returned by `getTokenAccountsByOwner`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenAccountBalance {
    /// Token account address
    pub address: String,
    pub amount: TokenAmount,
}
