// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet verification and login endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    state::AppState,
    verification::{
        verify_login, ChallengeMethod, CompletionOutcome, VerificationChallenge, VerificationResult,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartVerificationRequest {
    pub user_id: String,
    pub wallet: String,
    #[serde(default)]
    pub method: ChallengeMethod,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteVerificationRequest {
    pub user_id: String,
    /// Community whose history holds the memo; omit for a self-transfer.
    #[serde(default)]
    pub community: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteVerificationResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    /// All wallets linked to the user after this verification.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wallets: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub wallet: String,
    /// Detached ed25519 signature bytes.
    pub signature: Vec<u8>,
    /// Unix milliseconds included in the signed message.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub wallets: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnlinkResponse {
    pub unlinked: bool,
    pub wallets: Vec<String>,
}

/// Issue a verification challenge for a claimed wallet.
///
/// Memo challenges use the user id as the code; amount challenges carry a
/// unique SOL amount to self-transfer.
#[utoipa::path(
    post,
    path = "/v1/verifications/challenge",
    tag = "Verification",
    request_body = StartVerificationRequest,
    responses(
        (status = 200, description = "Challenge issued", body = VerificationChallenge),
        (status = 400, description = "Invalid wallet address")
    )
)]
pub async fn start_verification(
    State(state): State<AppState>,
    Json(request): Json<StartVerificationRequest>,
) -> Result<Json<VerificationChallenge>, ApiError> {
    let challenge = state
        .verification
        .start(&request.user_id, &request.wallet, request.method)
        .await?;
    Ok(Json(challenge))
}

/// Look for the transaction answering the pending challenge.
#[utoipa::path(
    post,
    path = "/v1/verifications/complete",
    tag = "Verification",
    request_body = CompleteVerificationRequest,
    responses(
        (status = 200, description = "Verification outcome", body = CompleteVerificationResponse),
        (status = 404, description = "No pending challenge"),
        (status = 503, description = "Ledger unavailable, try again later")
    )
)]
pub async fn complete_verification(
    State(state): State<AppState>,
    Json(request): Json<CompleteVerificationRequest>,
) -> Result<Json<CompleteVerificationResponse>, ApiError> {
    let outcome = state
        .verification
        .complete(&request.user_id, request.community.as_deref())
        .await?;

    let response = match outcome {
        CompletionOutcome::NoPendingChallenge => {
            return Err(ApiError::not_found("No pending verification"));
        }
        CompletionOutcome::NotFound => CompleteVerificationResponse {
            verified: false,
            result: None,
            wallets: Vec::new(),
        },
        CompletionOutcome::Verified { result, wallets } => CompleteVerificationResponse {
            verified: true,
            result: Some(result),
            wallets,
        },
    };
    Ok(Json(response))
}

/// Link a wallet by signing the login message with it.
#[utoipa::path(
    post,
    path = "/v1/login",
    tag = "Verification",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Wallet linked", body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Signature invalid or expired")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    verify_login(
        &request.user_id,
        &request.wallet,
        &request.signature,
        request.timestamp,
        Utc::now().timestamp_millis(),
    )?;
    let wallets = state
        .verification
        .registry()
        .link(&request.user_id, &request.wallet)
        .await?;
    Ok(Json(LoginResponse { wallets }))
}

/// Unlink a wallet; the request must carry a fresh login signature by it.
#[utoipa::path(
    post,
    path = "/v1/wallets/unlink",
    tag = "Verification",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Wallet unlinked if it was linked", body = UnlinkResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Signature invalid or expired")
    )
)]
pub async fn unlink_wallet(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UnlinkResponse>, ApiError> {
    verify_login(
        &request.user_id,
        &request.wallet,
        &request.signature,
        request.timestamp,
        Utc::now().timestamp_millis(),
    )?;
    let registry = state.verification.registry();
    let unlinked = registry.unlink(&request.user_id, &request.wallet).await?;
    let wallets = registry.wallets(&request.user_id).await?;
    Ok(Json(UnlinkResponse { unlinked, wallets }))
}
