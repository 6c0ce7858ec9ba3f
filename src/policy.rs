// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access decisions from community rules and on-chain holdings.
//!
//! Chain-read failures produce [`AccessDecision::Undetermined`], which callers
//! must treat as "skip this pass and try again later". It is never a deny.

use serde::Serialize;
use utoipa::ToSchema;

use crate::balances::TokenLedger;
use crate::rules::CommunityRules;

/// How much of the gating token a member must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldingRequirement {
    /// Percentage (0-100) of total supply.
    PercentOfSupply(f64),
    Absolute(f64),
    None,
}

/// Percentage thresholds take precedence over absolute balances.
pub fn requirement(rules: &CommunityRules) -> HoldingRequirement {
    if rules.min_token_percentage > 0.0 {
        HoldingRequirement::PercentOfSupply(rules.min_token_percentage)
    } else if rules.min_token_balance > 0.0 {
        HoldingRequirement::Absolute(rules.min_token_balance)
    } else {
        HoldingRequirement::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum AccessDecision {
    Allow {
        #[serde(skip_serializing_if = "Option::is_none")]
        held: Option<f64>,
        whale: bool,
    },
    Deny {
        required: f64,
        held: f64,
    },
    Undetermined {
        reason: String,
    },
}

/// Compare the aggregate holdings of `wallets` against `rules`.
pub async fn evaluate_holdings(ledger: &TokenLedger, rules: &CommunityRules, wallets: &[String]) -> AccessDecision {
    let (Some(mint), true) = (rules.token_mint.as_deref(), rules.is_token_gated()) else {
        return AccessDecision::Allow {
            held: None,
            whale: false,
        };
    };
    let requirement = requirement(rules);

    let Some(held) = ledger.aggregated_token_balance(wallets, mint).await else {
        return undetermined("token balance unavailable");
    };

    let needs_supply = matches!(requirement, HoldingRequirement::PercentOfSupply(_)) || rules.whale_percentage > 0.0;
    let supply = if needs_supply {
        match ledger.token_supply(mint).await {
            Some(supply) => Some(supply),
            None if matches!(requirement, HoldingRequirement::PercentOfSupply(_)) => {
                return undetermined("token supply unavailable");
            }
            None => None,
        }
    } else {
        None
    };

    let required = match requirement {
        HoldingRequirement::PercentOfSupply(pct) => supply.unwrap_or_default() * pct / 100.0,
        HoldingRequirement::Absolute(amount) => amount,
        HoldingRequirement::None => 0.0,
    };

    if held < required {
        tracing::info!(mint = %mint, held, required, "Holdings below requirement");
        return AccessDecision::Deny { required, held };
    }

    AccessDecision::Allow {
        held: Some(held),
        whale: supply.is_some_and(|supply| is_whale(held, supply, rules)),
    }
}

fn undetermined(reason: &str) -> AccessDecision {
    tracing::warn!(reason, "Access undetermined");
    AccessDecision::Undetermined {
        reason: reason.to_string(),
    }
}

/// Whether `balance` is at least `whale_percentage` of `supply`.
pub fn is_whale(balance: f64, supply: f64, rules: &CommunityRules) -> bool {
    rules.whale_percentage > 0.0 && supply > 0.0 && balance >= supply * rules.whale_percentage / 100.0
}

/// First banned word contained in `text`, compared case-insensitively.
pub fn banned_word<'a>(rules: &'a CommunityRules, text: &str) -> Option<&'a str> {
    let text = text.to_lowercase();
    rules
        .banned_words
        .iter()
        .filter(|w| !w.is_empty())
        .find(|w| text.contains(&w.to_lowercase()))
        .map(String::as_str)
}

/// A member's holdings fell since they last spoke.
pub fn jeet_alert(previous: Option<f64>, current: f64) -> bool {
    previous.is_some_and(|previous| current < previous)
}
