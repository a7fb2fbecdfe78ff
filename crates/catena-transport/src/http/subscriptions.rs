// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST subscriptions controller, supplementing the RPC surface the way the
//! original SDK's `connections/REST/controllers/Subscriptions` endpoint
//! does: a resource-oriented view over `UpdateSubscriptions` plus a plain
//! listing `GetValue`/`Connect` don't otherwise expose.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode as HttpStatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use catena_core::device::Slot;
use catena_core::rpc::{handlers, template};
use serde::Deserialize;

use crate::error_map::to_http_response;
use crate::state::ServiceState;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

pub async fn list_subscriptions(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    let Some(subs) = state.subscriptions.get(slot) else {
        return HttpStatusCode::NOT_FOUND.into_response();
    };
    let authz = match template::authorize(bearer.as_deref(), state.authz_enabled).await {
        Ok(authz) => authz,
        Err(err) => return to_http_response(&err).into_response(),
    };
    let device = match template::resolve_device(state.registry.as_ref(), slot) {
        Ok(device) => device,
        Err(err) => return to_http_response(&err).into_response(),
    };
    let mut oids: Vec<String> = subs.get_all_subscribed_oids(device.as_ref(), &authz).into_iter().collect();
    oids.sort();
    Json(oids).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionOidQuery {
    pub oid: String,
}

pub async fn add_subscription(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<SubscriptionOidQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    let Some(subs) = state.subscriptions.get(slot) else {
        return HttpStatusCode::NOT_FOUND.into_response();
    };
    match handlers::update_subscriptions(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        vec![q.oid],
        vec![],
        subs,
    )
    .await
    {
        Ok(_) => HttpStatusCode::NO_CONTENT.into_response(),
        Err(err) => to_http_response(&err).into_response(),
    }
}

pub async fn remove_subscription(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<SubscriptionOidQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    let Some(subs) = state.subscriptions.get(slot) else {
        return HttpStatusCode::NOT_FOUND.into_response();
    };
    match handlers::update_subscriptions(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        vec![],
        vec![q.oid],
        subs,
    )
    .await
    {
        Ok(_) => HttpStatusCode::NO_CONTENT.into_response(),
        Err(err) => to_http_response(&err).into_response(),
    }
}

#[cfg(test)]
#[path = "subscriptions_tests.rs"]
mod tests;
