// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration module.
//!
//! This module provides:
//! - The chain-read capability (`ChainReader`) and its JSON-RPC client
//! - Retry with exponential backoff around every read
//! - Rate-limited, order-preserving history scans
//! - Base58 addresses and associated token account derivation

pub mod client;
pub mod pubkey;
pub mod reader;
pub mod retry;
pub mod scan;
pub mod types;

pub use client::SolanaRpcClient;
pub use pubkey::{associated_token_addresses, Pubkey};
pub use reader::{ChainError, ChainReader};
pub use retry::RetryPolicy;
pub use scan::ScanPolicy;
pub use types::*;
