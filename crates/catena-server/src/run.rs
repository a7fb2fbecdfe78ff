// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server startup: tracing init, device wiring, and the gRPC/HTTP/health
//! listener spawns, mirroring the teacher's `run::init_tracing`/`run::run`
//! shape (one `tokio::spawn` per listener, all cancelled from one
//! `CancellationToken`).

use std::sync::Arc;

use axum::routing::get;
use axum::Json;
use catena_transport::grpc::CatenaGrpc;
use catena_transport::state::ServiceState;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::devices::demo_registry;

/// Initializes `tracing` from `config`. Uses `try_init` so it's safe to call
/// more than once (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("CATENA_LOG_LEVEL").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn build_health_router() -> axum::Router {
    axum::Router::new().route("/healthz", get(health))
}

/// Runs the server until `shutdown` is cancelled (e.g. Ctrl-C, or a
/// `Shutdown` RPC call, which also cancels the same token).
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);

    let registry = Arc::new(demo_registry());
    let state = ServiceState::new(registry, config.auth, config.max_connections);
    let shutdown = state.shutdown.clone();

    let grpc_addr = format!("{}:{}", config.host, config.grpc_port).parse()?;
    let grpc = CatenaGrpc::new(state.clone());
    let sd = shutdown.clone();
    info!("gRPC listening on {grpc_addr}");
    tokio::spawn(async move {
        if let Err(e) = grpc.into_router().serve_with_shutdown(grpc_addr, sd.cancelled_owned()).await {
            error!("gRPC server error: {e}");
        }
    });

    let http_addr = format!("{}:{}", config.host, config.http_port);
    let http_listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP listening on {}", http_listener.local_addr()?);
    let http_router = catena_transport::http::build_router(state.clone());
    let sd = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, http_router).with_graceful_shutdown(sd.cancelled_owned()).await {
            error!("HTTP server error: {e}");
        }
    });

    if let Some(health_port) = config.health_port {
        let health_addr = format!("{}:{}", config.host, health_port);
        let health_listener = TcpListener::bind(&health_addr).await?;
        info!("health probe listening on {health_addr}");
        let sd = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) =
                axum::serve(health_listener, build_health_router()).with_graceful_shutdown(sd.cancelled_owned()).await
            {
                error!("health server error: {e}");
            }
        });
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received ctrl-c, shutting down"),
        _ = shutdown.cancelled() => info!("shutdown requested via RPC"),
    }
    shutdown.cancel();
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
