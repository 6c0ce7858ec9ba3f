// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use memo_gate::{
    api::router,
    blockchain::SolanaRpcClient,
    config::Config,
    logging::init_tracing,
    state::AppState,
    storage::KvDatabase,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    init_tracing();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");
    let store = KvDatabase::open(&config.database_path()).expect("Failed to open database");
    let chain = SolanaRpcClient::new(&config.rpc_url).expect("Invalid RPC URL");
    tracing::info!(rpc_url = %chain.rpc_url(), data_dir = %config.data_dir.display(), "Ledger client ready");

    let state = AppState::new(&config, Arc::new(chain), Arc::new(store));
    let app = router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Memo Gate listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
