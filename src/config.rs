// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | Ledger JSON-RPC endpoint | `https://api.mainnet-beta.solana.com` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the persistent store | `./data` |
//! | `RULES_CACHE_TTL_SECS` | Memory-tier rules TTL | `60` |
//! | `RULES_CACHE_CAPACITY` | Memory-tier max communities | `1024` |
//! | `RETRY_ATTEMPTS` | Attempts per ledger read | `3` |
//! | `RETRY_BASE_DELAY_MS` | First backoff delay | `1000` |
//! | `SCAN_SIGNATURE_LIMIT` | Signatures examined per history scan | `50` |
//! | `RULES_SCAN_SPACING_MS` | Pause between rules-scan fetches | `150` |
//! | `VERIFY_BATCH_SIZE` | Concurrent fetches per verification batch | `5` |
//! | `VERIFY_BATCH_SPACING_MS` | Pause between verification batches | `200` |
//! | `VERIFICATION_MINT` | Token mint accepted for amount verification | MEMO mint |
//! | `VERIFICATION_MINT_DECIMALS` | Decimals of the verification mint | `6` |
//! | `CHALLENGE_TTL_SECS` | Lifetime of a pending challenge | `900` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{RetryPolicy, ScanPolicy, DEFAULT_RPC_URL};

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory holding the redb database file.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const RULES_CACHE_TTL_SECS_ENV: &str = "RULES_CACHE_TTL_SECS";
pub const RULES_CACHE_CAPACITY_ENV: &str = "RULES_CACHE_CAPACITY";
pub const RETRY_ATTEMPTS_ENV: &str = "RETRY_ATTEMPTS";
pub const RETRY_BASE_DELAY_MS_ENV: &str = "RETRY_BASE_DELAY_MS";

/// Signature window shared by rules scans and verification scans.
///
/// There is no pagination: anything older than the window is invisible.
pub const SCAN_SIGNATURE_LIMIT_ENV: &str = "SCAN_SIGNATURE_LIMIT";
pub const RULES_SCAN_SPACING_MS_ENV: &str = "RULES_SCAN_SPACING_MS";
pub const VERIFY_BATCH_SIZE_ENV: &str = "VERIFY_BATCH_SIZE";
pub const VERIFY_BATCH_SPACING_MS_ENV: &str = "VERIFY_BATCH_SPACING_MS";

pub const VERIFICATION_MINT_ENV: &str = "VERIFICATION_MINT";
pub const VERIFICATION_MINT_DECIMALS_ENV: &str = "VERIFICATION_MINT_DECIMALS";

/// MEMO token, the default verification mint.
pub const DEFAULT_VERIFICATION_MINT: &str = "8ZQme2xv6prRKkKNA4PTn5DSXUTdY6yeoc5yDkm7pump";

pub const CHALLENGE_TTL_SECS_ENV: &str = "CHALLENGE_TTL_SECS";

/// `json` selects JSON log lines; anything else the pretty formatter.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the persistent store inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "memo-gate.redb";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rpc_url: String,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub rules_cache_ttl: Duration,
    pub rules_cache_capacity: usize,
    pub retry: RetryPolicy,
    pub rules_scan: ScanPolicy,
    pub verification_scan: ScanPolicy,
    pub verification_mint: String,
    pub verification_mint_decimals: u8,
    pub challenge_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or unparsable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let num = |name: &str, default: u64| parse_or(name, lookup(name), default);

        let signature_limit = num(SCAN_SIGNATURE_LIMIT_ENV, 50) as usize;

        Self {
            rpc_url: get(RPC_URL_ENV, DEFAULT_RPC_URL),
            host: get(HOST_ENV, "0.0.0.0"),
            port: parse_or(PORT_ENV, lookup(PORT_ENV), 8080),
            data_dir: PathBuf::from(get(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            rules_cache_ttl: Duration::from_secs(num(RULES_CACHE_TTL_SECS_ENV, 60)),
            rules_cache_capacity: num(RULES_CACHE_CAPACITY_ENV, 1024) as usize,
            retry: RetryPolicy::new(
                parse_or(RETRY_ATTEMPTS_ENV, lookup(RETRY_ATTEMPTS_ENV), 3),
                Duration::from_millis(num(RETRY_BASE_DELAY_MS_ENV, 1000)),
            ),
            rules_scan: ScanPolicy::sequential(
                signature_limit,
                Duration::from_millis(num(RULES_SCAN_SPACING_MS_ENV, 150)),
            ),
            verification_scan: ScanPolicy::batched(
                signature_limit,
                num(VERIFY_BATCH_SIZE_ENV, 5) as usize,
                Duration::from_millis(num(VERIFY_BATCH_SPACING_MS_ENV, 200)),
            ),
            verification_mint: get(VERIFICATION_MINT_ENV, DEFAULT_VERIFICATION_MINT),
            verification_mint_decimals: parse_or(
                VERIFICATION_MINT_DECIMALS_ENV,
                lookup(VERIFICATION_MINT_DECIMALS_ENV),
                6,
            ),
            challenge_ttl: Duration::from_secs(num(CHALLENGE_TTL_SECS_ENV, 900)),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparsable setting");
            default
        }),
        None => default,
    }
}
