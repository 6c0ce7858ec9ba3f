// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token balance and supply endpoints.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{blockchain::Pubkey, error::ApiError, state::AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBalanceRequest {
    pub mint: String,
    #[serde(default)]
    pub wallets: Vec<String>,
    /// Include every wallet linked to this user.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBalanceResponse {
    pub mint: String,
    pub wallets: Vec<String>,
    pub balance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplyResponse {
    pub mint: String,
    pub supply: f64,
}

/// Sum a token's balance across wallets.
///
/// All-or-nothing: if any single wallet cannot be read the request fails
/// with 503 instead of returning a partial sum.
#[utoipa::path(
    post,
    path = "/v1/balances/aggregate",
    tag = "Balances",
    request_body = AggregateBalanceRequest,
    responses(
        (status = 200, description = "Aggregate balance", body = AggregateBalanceResponse),
        (status = 400, description = "Invalid address"),
        (status = 503, description = "Balance undetermined, try again later")
    )
)]
pub async fn aggregate_balance(
    State(state): State<AppState>,
    Json(request): Json<AggregateBalanceRequest>,
) -> Result<Json<AggregateBalanceResponse>, ApiError> {
    Pubkey::from_str(&request.mint)?;
    let mut wallets = request.wallets;
    if let Some(user_id) = request.user_id.as_deref() {
        wallets.extend(state.verification.registry().wallets(user_id).await?);
    }
    for wallet in &wallets {
        Pubkey::from_str(wallet)?;
    }

    let balance = state
        .ledger
        .aggregated_token_balance(&wallets, &request.mint)
        .await
        .ok_or_else(|| ApiError::service_unavailable("Balance undetermined, try again later"))?;

    Ok(Json(AggregateBalanceResponse {
        mint: request.mint,
        wallets,
        balance,
    }))
}

/// Total supply of a token mint.
#[utoipa::path(
    get,
    path = "/v1/tokens/{mint}/supply",
    tag = "Balances",
    params(("mint" = String, Path, description = "Token mint (base58)")),
    responses(
        (status = 200, description = "Token supply", body = SupplyResponse),
        (status = 503, description = "Supply undetermined, try again later")
    )
)]
pub async fn token_supply(
    State(state): State<AppState>,
    Path(mint): Path<String>,
) -> Result<Json<SupplyResponse>, ApiError> {
    Pubkey::from_str(&mint)?;
    let supply = state
        .ledger
        .token_supply(&mint)
        .await
        .ok_or_else(|| ApiError::service_unavailable("Supply undetermined, try again later"))?;
    Ok(Json(SupplyResponse { mint, supply }))
}
