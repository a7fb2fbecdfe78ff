// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE binding for Connect. The teacher streams over a WebSocket instead;
//! this shape — `axum::response::sse::Sse` fed by a forwarding task reading
//! a channel — follows the dashboard stream in `iwismer-rusty-timer`'s
//! `http/sse.rs`.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use catena_core::connect::{connect as core_connect, deregister};
use catena_core::device::Slot;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use super::json::{JsonDetailLevel, JsonPushUpdate};
use crate::error_map::to_http_response;
use crate::state::ServiceState;

fn bearer(headers: &axum::http::HeaderMap) -> Option<String> {
    headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub detail_level: JsonDetailLevel,
    #[serde(default)]
    pub force_connection: bool,
}

/// Streams `PushUpdate`s for the device in `slot` as server-sent events.
pub async fn connect(
    State(state): State<Arc<ServiceState>>,
    Path(_slot): Path<Slot>,
    Query(q): Query<ConnectQuery>,
    headers: axum::http::HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    let authz = match catena_core::rpc::template::authorize(bearer.as_deref(), state.authz_enabled).await {
        Ok(authz) => authz,
        Err(err) => return to_http_response(&err).into_response(),
    };
    let priority = if q.force_connection { 1 } else { 0 };
    let (id, mut rx) = match core_connect(
        state.registry.clone(),
        authz,
        q.detail_level.into(),
        priority,
        state.subscriptions.as_session_subscriptions(),
        state.queue.clone(),
        state.shutdown.clone(),
    ) {
        Ok(pair) => pair,
        Err(err) => return to_http_response(&err).into_response(),
    };

    let (tx, out_rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(64);
    let queue = state.queue.clone();
    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let json = JsonPushUpdate::from(update);
            let event = serde_json::to_string(&json)
                .map(|data| Event::default().event("push_update").data(data))
                .unwrap_or_else(|_| Event::default().event("error").data("{}"));
            if tx.send(Ok(event)).await.is_err() {
                break;
            }
        }
        deregister(queue.as_ref(), id);
    });

    Sse::new(ReceiverStream::new(out_rx))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keepalive"))
        .into_response()
}

#[cfg(test)]
#[path = "connect_sse_tests.rs"]
mod tests;
