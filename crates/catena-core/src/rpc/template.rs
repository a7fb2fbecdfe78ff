// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RPC handler lifecycle (C7): authorization gate, slot lookup, and the
//! uniform error-conversion boundary every handler in `rpc::handlers` goes
//! through.
//!
//! The original CREATE/PROCESS/WRITE/FINISH state machine exists because
//! the source dispatches over a completion queue with a fixed-size handler
//! pool that must explicitly re-arm a spare listener per RPC kind
//! (invariant 7). tonic and axum instead spawn a fresh task per inbound
//! call, so "exactly one spare handler of each kind always listening" is a
//! structural guarantee of the runtime rather than something this crate
//! needs to implement — `dispatch_unary`/`dispatch_streaming` below realize
//! PROCESS only: authenticate, resolve the device, run the handler body.
//! FINISH's job (uniform `CatenaError` → transport status) happens in
//! `catena-transport::error_map`, not here.

use std::future::Future;
use std::sync::Arc;

use crate::authz::Authorizer;
use crate::device::{Device, DeviceRegistry, Slot};
use crate::status::{CatenaError, CatenaResult, StatusCode};

/// Extracts the bearer token from an `authorization` header value
/// (case-insensitive `Bearer ` prefix) and parses it into an `Authorizer`.
/// When `authz_enabled` is false, returns the disabled sentinel without
/// looking at `bearer_header` at all.
pub async fn authorize(bearer_header: Option<&str>, authz_enabled: bool) -> CatenaResult<Authorizer> {
    if !authz_enabled {
        return Ok(Authorizer::disabled());
    }
    let header = bearer_header
        .ok_or_else(|| CatenaError::new(StatusCode::Unauthenticated, "JWS bearer token not found"))?;
    let token = strip_bearer_prefix(header)
        .ok_or_else(|| CatenaError::new(StatusCode::Unauthenticated, "JWS bearer token not found"))?;
    Authorizer::new(token)
}

fn strip_bearer_prefix(header: &str) -> Option<&str> {
    let prefix_len = "bearer ".len();
    if header.len() < prefix_len {
        return None;
    }
    let (prefix, rest) = header.split_at(prefix_len);
    prefix.eq_ignore_ascii_case("bearer ").then_some(rest)
}

/// Resolves `slot` in `registry`. `NOT_FOUND` ("device not found in slot
/// <n>") if absent.
pub fn resolve_device(registry: &dyn DeviceRegistry, slot: Slot) -> CatenaResult<Arc<dyn Device>> {
    registry
        .get(slot)
        .ok_or_else(|| CatenaError::new(StatusCode::NotFound, format!("device not found in slot {slot}")))
}

/// PROCESS for a unary handler: authenticate, resolve the device, then run
/// `body`. Device-mutex acquisition (where the concrete `Device` needs it)
/// is the implementation's own concern, not modeled generically here — the
/// trait exposes only the async operations a handler needs.
pub async fn dispatch_unary<F, Fut, T>(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    body: F,
) -> CatenaResult<T>
where
    F: FnOnce(Arc<dyn Device>, Authorizer) -> Fut,
    Fut: Future<Output = CatenaResult<T>>,
{
    let authz = authorize(bearer_header, authz_enabled).await?;
    let device = resolve_device(registry, slot)?;
    body(device, authz).await
}

/// PROCESS for a server-streaming handler whose body materializes its
/// whole response sequence up front (bounded by device-tree size in every
/// handler this crate defines) rather than yielding incrementally; the
/// transport crate turns the returned `Vec<T>` into a wire-level stream.
pub async fn dispatch_streaming<F, Fut, T>(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    body: F,
) -> CatenaResult<Vec<T>>
where
    F: FnOnce(Arc<dyn Device>, Authorizer) -> Fut,
    Fut: Future<Output = CatenaResult<Vec<T>>>,
{
    dispatch_unary(bearer_header, authz_enabled, registry, slot, body).await
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
