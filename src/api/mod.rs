// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    policy::AccessDecision,
    rules::CommunityRules,
    state::AppState,
    verification::{ChallengeMethod, VerificationChallenge, VerificationResult},
};

pub mod balances;
pub mod health;
pub mod rules;
pub mod verification;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/communities/{address}/rules", get(rules::get_rules))
        .route("/communities/{address}/access", post(rules::evaluate_access))
        .route("/balances/aggregate", post(balances::aggregate_balance))
        .route("/tokens/{mint}/supply", get(balances::token_supply))
        .route("/verifications/challenge", post(verification::start_verification))
        .route("/verifications/complete", post(verification::complete_verification))
        .route("/login", post(verification::login))
        .route("/wallets/unlink", post(verification::unlink_wallet))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        rules::get_rules,
        rules::evaluate_access,
        balances::aggregate_balance,
        balances::token_supply,
        verification::start_verification,
        verification::complete_verification,
        verification::login,
        verification::unlink_wallet
    ),
    components(
        schemas(
            CommunityRules,
            AccessDecision,
            VerificationChallenge,
            VerificationResult,
            ChallengeMethod,
            health::HealthResponse,
            rules::AccessRequest,
            rules::AccessResponse,
            balances::AggregateBalanceRequest,
            balances::AggregateBalanceResponse,
            balances::SupplyResponse,
            verification::StartVerificationRequest,
            verification::CompleteVerificationRequest,
            verification::CompleteVerificationResponse,
            verification::LoginRequest,
            verification::LoginResponse,
            verification::UnlinkResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Communities", description = "Community rules and access decisions"),
        (name = "Balances", description = "Fail-closed token balances and supply"),
        (name = "Verification", description = "Wallet ownership proofs")
    )
)]
struct ApiDoc;
