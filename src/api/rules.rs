// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Community rules and access endpoints.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    blockchain::Pubkey,
    error::ApiError,
    policy::{banned_word, evaluate_holdings, jeet_alert, AccessDecision},
    rules::CommunityRules,
    state::AppState,
};

/// Resolve the current rules of a community.
///
/// Served from memory when fresh, otherwise from the newest rules memo on
/// chain, otherwise from the last known good copy.
#[utoipa::path(
    get,
    path = "/v1/communities/{address}/rules",
    tag = "Communities",
    params(("address" = String, Path, description = "Community address (base58)")),
    responses(
        (status = 200, description = "Current rules", body = CommunityRules),
        (status = 400, description = "Invalid address"),
        (status = 404, description = "No rules have ever been published")
    )
)]
pub async fn get_rules(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<CommunityRules>, ApiError> {
    Pubkey::from_str(&address)?;
    state
        .rules
        .get_rules(&address)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No rules found for this community"))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    /// Only wallets this user has proven ownership of are counted.
    pub user_id: String,
    /// Message text to check against banned words.
    #[serde(default)]
    pub text: Option<String>,
    /// Holdings when the member last spoke, for jeet alerts.
    #[serde(default)]
    pub previous_balance: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub decision: AccessDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banned_word: Option<String>,
    pub jeet_alert: bool,
    pub images_only: bool,
}

/// Evaluate a member against the community's rules.
///
/// Holdings are summed over the user's verified wallets. Returns 503 when
/// holdings or supply cannot be read; that outcome is never reported as a
/// deny.
#[utoipa::path(
    post,
    path = "/v1/communities/{address}/access",
    tag = "Communities",
    params(("address" = String, Path, description = "Community address (base58)")),
    request_body = AccessRequest,
    responses(
        (status = 200, description = "Access decision", body = AccessResponse),
        (status = 400, description = "Invalid address"),
        (status = 404, description = "No rules have ever been published"),
        (status = 503, description = "Holdings undetermined, try again later")
    )
)]
pub async fn evaluate_access(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(request): Json<AccessRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    Pubkey::from_str(&address)?;
    let rules = state
        .rules
        .get_rules(&address)
        .await
        .ok_or_else(|| ApiError::not_found("No rules found for this community"))?;

    let wallets = state.verification.registry().wallets(&request.user_id).await?;
    for wallet in &wallets {
        Pubkey::from_str(wallet)?;
    }

    let decision = evaluate_holdings(&state.ledger, &rules, &wallets).await;
    let jeet = match &decision {
        AccessDecision::Undetermined { reason } => {
            return Err(ApiError::service_unavailable(format!("Try again later: {reason}")));
        }
        AccessDecision::Allow { held: Some(held), .. } if rules.jeet_mode => jeet_alert(request.previous_balance, *held),
        _ => false,
    };

    Ok(Json(AccessResponse {
        banned_word: request
            .text
            .as_deref()
            .and_then(|text| banned_word(&rules, text))
            .map(str::to_string),
        jeet_alert: jeet,
        images_only: rules.images_only,
        decision,
    }))
}
