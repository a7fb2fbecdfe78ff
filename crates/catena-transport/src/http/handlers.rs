// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST handlers — one per unary/streaming RPC, each a thin adapter from
//! HTTP request shapes onto `catena_core::rpc::handlers`, mirroring the
//! `transport/http` handler-per-route pattern.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode as HttpStatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use catena_core::device::Slot;
use catena_core::rpc::handlers;
use catena_core::status::CatenaError;
use serde::Deserialize;

use super::json::{
    JsonCommandResponse, JsonDetailLevel, JsonLanguagePack, JsonParam, JsonParamDetail, JsonParamInfo, JsonSetEntry,
    JsonValue,
};
use crate::error_map::to_http_response;
use crate::state::ServiceState;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

fn err_response(err: CatenaError) -> Response {
    to_http_response(&err).into_response()
}

pub async fn get_populated_slots(State(state): State<Arc<ServiceState>>) -> Json<Vec<Slot>> {
    Json(handlers::get_populated_slots(state.registry.as_ref()))
}

#[derive(Debug, Deserialize)]
pub struct OidQuery {
    pub oid: String,
}

pub async fn get_value(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<OidQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::get_value(bearer.as_deref(), state.authz_enabled, state.registry.as_ref(), slot, &q.oid).await {
        Ok(value) => Json(JsonValue::from(value)).into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn get_param(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<OidQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::get_param(bearer.as_deref(), state.authz_enabled, state.registry.as_ref(), slot, &q.oid).await {
        Ok(detail) => Json(JsonParamDetail::from(detail)).into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn set_value(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<OidQuery>,
    headers: HeaderMap,
    Json(value): Json<JsonValue>,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::set_value(bearer.as_deref(), state.authz_enabled, state.registry.as_ref(), slot, &q.oid, value.into())
        .await
    {
        Ok(()) => HttpStatusCode::NO_CONTENT.into_response(),
        Err(err) => err_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct MultiSetBody {
    pub values: Vec<JsonSetEntry>,
}

pub async fn multi_set_value(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    headers: HeaderMap,
    Json(body): Json<MultiSetBody>,
) -> Response {
    let bearer = bearer(&headers);
    let values = body.values.into_iter().map(|e| (e.oid, e.value.into())).collect();
    match handlers::multi_set_value(bearer.as_deref(), state.authz_enabled, state.registry.as_ref(), slot, values).await {
        Ok(()) => HttpStatusCode::NO_CONTENT.into_response(),
        Err(err) => err_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeviceRequestQuery {
    pub detail_level: JsonDetailLevel,
    #[serde(default)]
    pub subscribed_oids: Option<String>,
}

pub async fn device_request(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<DeviceRequestQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    let subscribed_oids: Vec<String> =
        q.subscribed_oids.map(|s| s.split(',').map(str::to_owned).collect()).unwrap_or_default();
    let subs = state.subscriptions.get(slot).map(|m| m.as_ref());
    match handlers::device_request(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        q.detail_level.into(),
        subscribed_oids,
        subs,
    )
    .await
    {
        Ok(entries) => Json(entries.into_iter().map(JsonParam::from).collect::<Vec<_>>()).into_response(),
        Err(err) => err_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecuteCommandQuery {
    pub oid: String,
    #[serde(default)]
    pub respond: bool,
}

pub async fn execute_command(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<ExecuteCommandQuery>,
    headers: HeaderMap,
    Json(value): Json<JsonValue>,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::execute_command(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        &q.oid,
        value.into(),
        q.respond,
    )
    .await
    {
        Ok(responses) => {
            Json(responses.into_iter().map(JsonCommandResponse::from).collect::<Vec<_>>()).into_response()
        }
        Err(err) => err_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddLanguageBody {
    pub language_id: String,
    pub language_pack: JsonLanguagePack,
}

pub async fn add_language(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    headers: HeaderMap,
    Json(body): Json<AddLanguageBody>,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::add_language(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        &body.language_id,
        body.language_pack.into(),
    )
    .await
    {
        Ok(()) => HttpStatusCode::NO_CONTENT.into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn list_languages(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::list_languages(bearer.as_deref(), state.authz_enabled, state.registry.as_ref(), slot).await {
        Ok(languages) => Json(languages).into_response(),
        Err(err) => err_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct ParamInfoQuery {
    #[serde(default)]
    pub oid_prefix: Option<String>,
    #[serde(default)]
    pub recursive: bool,
}

pub async fn param_info_request(
    State(state): State<Arc<ServiceState>>,
    Path(slot): Path<Slot>,
    Query(q): Query<ParamInfoQuery>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer(&headers);
    match handlers::param_info_request(
        bearer.as_deref(),
        state.authz_enabled,
        state.registry.as_ref(),
        slot,
        q.oid_prefix.as_deref(),
        q.recursive,
    )
    .await
    {
        Ok(entries) => Json(entries.into_iter().map(JsonParamInfo::from).collect::<Vec<_>>()).into_response(),
        Err(err) => err_response(err),
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
