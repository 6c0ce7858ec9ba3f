// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Memo Gate - Token-Gated Community Chain-State Engine
//!
//! This crate discovers community rules published as on-chain memos, proves
//! wallet ownership from signed transactions, and aggregates token holdings
//! with fail-closed semantics. The ledger is the only source of truth.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `balances` - Fail-closed token balance and supply reads
//! - `blockchain` - Ledger JSON-RPC client, retry and scan policies
//! - `crypto` - Memo envelope encryption and compression
//! - `policy` - Access decisions from rules and holdings
//! - `rules` - Tiered community rules resolution
//! - `storage` - Persistent key-value store (redb)
//! - `verification` - Wallet ownership proofs and signed login

pub mod api;
pub mod balances;
pub mod blockchain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod policy;
pub mod rules;
pub mod state;
pub mod storage;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;
