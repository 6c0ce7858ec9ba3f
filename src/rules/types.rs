// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Community rules and memo payload classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::crypto::{CryptoError, EncryptedEnvelope};

/// Discriminator carried by rules memos.
pub const COMMUNITY_RULES_TYPE: &str = "COMMUNITY_RULES";

/// Governance rules published by a community address in a memo.
///
/// Rules are never mutated; a newer memo supersedes an older one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRules {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
    /// Absolute holding requirement, ignored when `min_token_percentage > 0`.
    #[serde(default)]
    pub min_token_balance: f64,
    /// Holding requirement as a percentage of total supply.
    #[serde(default)]
    pub min_token_percentage: f64,
    #[serde(default)]
    pub whale_percentage: f64,
    #[serde(default)]
    pub banned_words: Vec<String>,
    #[serde(default)]
    pub images_only: bool,
    #[serde(default)]
    pub jeet_mode: bool,
    /// Fee payer of the memo transaction; attached on discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl CommunityRules {
    /// Whether membership depends on token holdings at all.
    pub fn is_token_gated(&self) -> bool {
        self.token_mint.is_some() && (self.min_token_percentage > 0.0 || self.min_token_balance > 0.0)
    }
}

/// A decoded memo, classified once before any branching.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoPayload {
    PlainRules(CommunityRules),
    EncryptedEnvelope(EncryptedEnvelope),
    Unrecognized,
}

impl MemoPayload {
    pub fn classify(text: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return MemoPayload::Unrecognized;
        };
        let Some(object) = value.as_object() else {
            return MemoPayload::Unrecognized;
        };

        if object.contains_key("encrypted") && object.contains_key("nonce") {
            return match serde_json::from_value(value) {
                Ok(envelope) => MemoPayload::EncryptedEnvelope(envelope),
                Err(_) => MemoPayload::Unrecognized,
            };
        }

        if object.get("type").and_then(Value::as_str) == Some(COMMUNITY_RULES_TYPE) {
            if let Ok(rules) = serde_json::from_value(value) {
                return MemoPayload::PlainRules(rules);
            }
        }

        MemoPayload::Unrecognized
    }

    /// Resolve to rules, decrypting an envelope with the community address.
    ///
    /// Envelopes do not nest: decrypted text must be plain rules.
    pub fn into_rules(self, community_address: &str) -> Result<Option<CommunityRules>, CryptoError> {
        match self {
            MemoPayload::PlainRules(rules) => Ok(Some(rules)),
            MemoPayload::EncryptedEnvelope(envelope) => {
                let text = envelope.open(community_address)?;
                match MemoPayload::classify(&text) {
                    MemoPayload::PlainRules(rules) => Ok(Some(rules)),
                    _ => Ok(None),
                }
            }
            MemoPayload::Unrecognized => Ok(None),
        }
    }
}
