// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use smart_deals_server::{
    api::router,
    auth::{AccessPolicy, FirebaseVerifier, JwksManager},
    config::{Config, StorageConfig},
    state::AppState,
    storage::{DocumentStore, InMemoryStore, MongoStore},
    telemetry::{init_tracing, LogFormat},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    let store: Arc<dyn DocumentStore> = match &config.storage {
        StorageConfig::Memory => {
            warn!("Using in-memory storage; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        StorageConfig::Mongo {
            uri,
            database,
            app_name,
        } => match MongoStore::connect(uri, database, app_name).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Failed to connect to MongoDB: {e}");
                process::exit(1);
            }
        },
    };

    if let Err(e) = store.ping().await {
        error!("Storage ping failed: {e}");
        process::exit(1);
    }
    info!("Storage reachable");

    let verifier = FirebaseVerifier::new(
        JwksManager::new(config.jwks_url.clone()),
        config.firebase_project_id.clone(),
    );
    let state = AppState::new(store.clone(), Arc::new(verifier))
        .with_policy(AccessPolicy::for_mode(config.policy_mode));
    info!(policy = ?config.policy_mode, "Access policy loaded");

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {e}", config.bind_addr);
            process::exit(1);
        }
    };
    info!("Smart Deals server listening on http://{} (docs at /docs)", config.bind_addr);

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        error!("Server error: {e}");
    }

    store.shutdown().await;
    info!("Server shutdown complete");
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
    shutdown.cancel();
}
