// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger fake and transaction builders shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use crate::blockchain::{
    AccountKey, ChainError, ChainReader, ParsedInstruction, ParsedTransaction, SignatureInfo,
    TokenAccountBalance, TokenAmount, TransactionEnvelope, TransactionMessage, TransactionMeta,
    MEMO_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

#[derive(Default)]
pub struct FakeChain {
    /// address → signatures, newest first
    pub history: Mutex<HashMap<String, Vec<String>>>,
    pub transactions: Mutex<HashMap<String, ParsedTransaction>>,
    /// (owner, mint) → ui amounts per token account
    pub holdings: Mutex<HashMap<(String, String), Vec<f64>>>,
    pub supplies: Mutex<HashMap<String, f64>>,
    /// Addresses whose signature listing always fails.
    pub failing_addresses: Mutex<HashSet<String>>,
    /// Owners whose token account lookups always fail.
    pub failing_owners: Mutex<HashSet<String>>,
    /// Signatures whose transaction fetch always fails.
    pub failing_signatures: Mutex<HashSet<String>>,
    /// Remaining failures before signature listing starts succeeding.
    pub flaky_listing_failures: AtomicUsize,
    pub signature_calls: AtomicUsize,
    pub transaction_calls: AtomicUsize,
    pub token_account_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction as the newest entry in `address`'s history.
    pub fn push_tx(&self, address: &str, signature: &str, tx: ParsedTransaction) {
        self.history
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .insert(0, signature.to_string());
        self.transactions
            .lock()
            .unwrap()
            .insert(signature.to_string(), tx);
    }

    pub fn set_holding(&self, owner: &str, mint: &str, amounts: &[f64]) {
        self.holdings
            .lock()
            .unwrap()
            .insert((owner.to_string(), mint.to_string()), amounts.to_vec());
    }

    pub fn set_supply(&self, mint: &str, supply: f64) {
        self.supplies.lock().unwrap().insert(mint.to_string(), supply);
    }

    pub fn fail_address(&self, address: &str) {
        self.failing_addresses
            .lock()
            .unwrap()
            .insert(address.to_string());
    }

    pub fn fail_owner(&self, owner: &str) {
        self.failing_owners.lock().unwrap().insert(owner.to_string());
    }

    pub fn fail_signature(&self, signature: &str) {
        self.failing_signatures
            .lock()
            .unwrap()
            .insert(signature.to_string());
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ChainError> {
        self.signature_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_addresses.lock().unwrap().contains(address) {
            return Err(ChainError::RateLimited);
        }
        if self
            .flaky_listing_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ChainError::Http("connection reset".into()));
        }
        let history = self.history.lock().unwrap();
        Ok(history
            .get(address)
            .map(|sigs| {
                sigs.iter()
                    .take(limit)
                    .map(|s| SignatureInfo {
                        signature: s.clone(),
                        slot: 0,
                        block_time: None,
                        err: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, ChainError> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_signatures.lock().unwrap().contains(signature) {
            return Err(ChainError::Http("timed out".into()));
        }
        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }

    async fn token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<TokenAccountBalance>, ChainError> {
        self.token_account_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_owners.lock().unwrap().contains(owner) {
            return Err(ChainError::Rpc {
                code: -32005,
                message: "Node is behind".into(),
            });
        }
        let holdings = self.holdings.lock().unwrap();
        Ok(holdings
            .get(&(owner.to_string(), mint.to_string()))
            .map(|amounts| {
                amounts
                    .iter()
                    .enumerate()
                    .map(|(i, ui)| TokenAccountBalance {
                        address: format!("{owner}-ata-{i}"),
                        amount: TokenAmount {
                            amount: String::new(),
                            decimals: 6,
                            ui_amount: Some(*ui),
                            ui_amount_string: None,
                        },
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn token_supply(&self, mint: &str) -> Result<TokenAmount, ChainError> {
        self.supplies
            .lock()
            .unwrap()
            .get(mint)
            .map(|s| TokenAmount {
                amount: String::new(),
                decimals: 6,
                ui_amount: Some(*s),
                ui_amount_string: None,
            })
            .ok_or_else(|| ChainError::Rpc {
                code: -32602,
                message: "Invalid param: not a Token mint".into(),
            })
    }
}

/// A successful transaction signed by `signer` carrying `instructions`.
pub fn tx_signed_by(signer: &str, instructions: Vec<ParsedInstruction>) -> ParsedTransaction {
    ParsedTransaction {
        slot: 1,
        block_time: Some(1_700_000_000),
        meta: Some(TransactionMeta {
            err: None,
            fee: 5000,
            inner_instructions: None,
        }),
        transaction: TransactionEnvelope {
            signatures: vec!["sig".into()],
            message: TransactionMessage {
                account_keys: vec![AccountKey {
                    pubkey: signer.to_string(),
                    signer: true,
                    writable: true,
                }],
                instructions,
            },
        },
    }
}

/// Memo instruction in parsed form.
pub fn memo_ix(text: &str) -> ParsedInstruction {
    ParsedInstruction {
        program: Some("spl-memo".into()),
        program_id: MEMO_PROGRAM_ID.into(),
        parsed: Some(json!(text)),
        data: None,
        accounts: None,
    }
}

/// Memo instruction carrying raw base64 data only.
pub fn raw_memo_ix(text: &str) -> ParsedInstruction {
    ParsedInstruction {
        program: None,
        program_id: MEMO_PROGRAM_ID.into(),
        parsed: None,
        data: Some(STANDARD.encode(text)),
        accounts: Some(Vec::new()),
    }
}

pub fn system_transfer_ix(source: &str, destination: &str, lamports: u64) -> ParsedInstruction {
    ParsedInstruction {
        program: Some("system".into()),
        program_id: SYSTEM_PROGRAM_ID.into(),
        parsed: Some(json!({
            "type": "transfer",
            "info": { "source": source, "destination": destination, "lamports": lamports }
        })),
        data: None,
        accounts: None,
    }
}

/// `transferChecked` with an explicit mint.
pub fn token_transfer_checked_ix(source: &str, destination: &str, mint: &str, ui_amount: f64) -> ParsedInstruction {
    ParsedInstruction {
        program: Some("spl-token".into()),
        program_id: TOKEN_PROGRAM_ID.into(),
        parsed: Some(json!({
            "type": "transferChecked",
            "info": {
                "source": source,
                "destination": destination,
                "mint": mint,
                "authority": "auth",
                "tokenAmount": { "amount": "0", "decimals": 6, "uiAmount": ui_amount }
            }
        })),
        data: None,
        accounts: None,
    }
}

/// Plain `transfer` (no mint field, raw amount only).
pub fn token_transfer_ix(program_id: &str, source: &str, destination: &str, raw_amount: u64) -> ParsedInstruction {
    ParsedInstruction {
        program: Some("spl-token".into()),
        program_id: program_id.into(),
        parsed: Some(json!({
            "type": "transfer",
            "info": {
                "source": source,
                "destination": destination,
                "authority": "auth",
                "amount": raw_amount.to_string()
            }
        })),
        data: None,
        accounts: None,
    }
}
