// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gzip compression for memo payloads, applied before encryption so they fit
//! the on-chain memo size limit.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::CryptoError;

/// Gzip `text` at maximum compression.
pub fn compress(text: &str) -> Result<Vec<u8>, CryptoError> {
    if text.is_empty() {
        return Err(CryptoError::EmptyMessage);
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CryptoError::Compression(e.to_string()))
}

/// Inflate gzip bytes back into UTF-8 text.
pub fn decompress(data: &[u8]) -> Result<String, CryptoError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = String::new();
    decoder
        .read_to_string(&mut out)
        .map_err(|e| CryptoError::Decompression(e.to_string()))?;
    Ok(out)
}
