// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/SSE transport: axum handlers over `State<Arc<ServiceState>>`,
//! generalizing the teacher's `transport/http` module.

mod connect_sse;
mod handlers;
mod subscriptions;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::ServiceState;

/// Builds the axum `Router` serving every unary/streaming RPC as HTTP/SSE.
pub fn build_router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/api/v1/slots", get(handlers::get_populated_slots))
        .route("/api/v1/devices/{slot}/value", get(handlers::get_value).put(handlers::set_value))
        .route("/api/v1/devices/{slot}/values", put(handlers::multi_set_value))
        .route("/api/v1/devices/{slot}/param", get(handlers::get_param))
        .route("/api/v1/devices/{slot}/device", get(handlers::device_request))
        .route("/api/v1/devices/{slot}/commands/execute", post(handlers::execute_command))
        .route("/api/v1/devices/{slot}/languages", get(handlers::list_languages).post(handlers::add_language))
        .route("/api/v1/devices/{slot}/params/info", get(handlers::param_info_request))
        .route(
            "/api/v1/devices/{slot}/subscriptions",
            get(subscriptions::list_subscriptions)
                .put(subscriptions::add_subscription)
                .delete(subscriptions::remove_subscription),
        )
        .route("/api/v1/devices/{slot}/connect", get(connect_sse::connect))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
