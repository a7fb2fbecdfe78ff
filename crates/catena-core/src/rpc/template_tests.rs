// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testing::{wildcard_fixture_device, MockRegistry};

#[tokio::test]
async fn authz_disabled_bypasses_header_entirely() {
    let authz = authorize(None, false).await.expect("disabled path never errors");
    assert!(authz.is_disabled());
}

#[tokio::test]
async fn missing_header_is_unauthenticated() {
    let err = authorize(None, true).await.unwrap_err();
    assert_eq!(err.code, StatusCode::Unauthenticated);
    assert_eq!(err.message, "JWS bearer token not found");
}

#[tokio::test]
async fn non_bearer_header_is_unauthenticated() {
    let err = authorize(Some("Basic abcdef"), true).await.unwrap_err();
    assert_eq!(err.code, StatusCode::Unauthenticated);
    assert_eq!(err.message, "JWS bearer token not found");
}

#[tokio::test]
async fn bearer_prefix_is_case_insensitive() {
    let payload = serde_json::json!({ "scope": "", "exp": 0 });
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        serde_json::to_vec(&payload).unwrap(),
    );
    let token = format!("h.{encoded}.s");
    assert!(authorize(Some(&format!("bearer {token}")), true).await.is_ok());
    assert!(authorize(Some(&format!("Bearer {token}")), true).await.is_ok());
}

// S6 — authz rejection: malformed token finishes UNAUTHENTICATED before
// any device call is made.
#[tokio::test]
async fn malformed_token_rejects_before_device_lookup() {
    let registry = MockRegistry::single(0, wildcard_fixture_device());
    let err = dispatch_unary(
        Some("Bearer not-a-token"),
        true,
        &registry,
        0,
        |_dev, _authz| async { Ok(()) },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, StatusCode::Unauthenticated);
    assert_eq!(err.message, "Invalid JWS Token");
}

#[tokio::test]
async fn unknown_slot_is_not_found() {
    let registry = MockRegistry::single(0, wildcard_fixture_device());
    let err = dispatch_unary(None, false, &registry, 7, |_dev, _authz| async { Ok(()) })
        .await
        .unwrap_err();
    assert_eq!(err.code, StatusCode::NotFound);
    assert_eq!(err.message, "device not found in slot 7");
}

#[tokio::test]
async fn body_runs_with_resolved_device_and_authorizer() {
    let registry = MockRegistry::single(0, wildcard_fixture_device());
    let value = dispatch_unary(None, false, &registry, 0, |dev, authz| async move {
        dev.get_value("/test/param1", &authz).await
    })
    .await
    .expect("body succeeds");
    assert_eq!(value, crate::device::Value::String("a".into()));
}
