// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::device::DetailLevel;
use crate::testing::{wildcard_fixture_device, DeviceBuilder, MockRegistry};

fn monitor_token() -> String {
    let payload = serde_json::json!({ "scope": "st2138:mon st2138:mon:w", "exp": 0 });
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        serde_json::to_vec(&payload).unwrap(),
    );
    format!("Bearer h.{encoded}.s")
}

fn read_only_token() -> String {
    let payload = serde_json::json!({ "scope": "st2138:mon", "exp": 0 });
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        serde_json::to_vec(&payload).unwrap(),
    );
    format!("Bearer h.{encoded}.s")
}

// S1 — GetValue happy path.
#[tokio::test]
async fn get_value_happy_path() {
    let dev = DeviceBuilder::default()
        .param("/gain", ParamKind::Scalar, Value::String("0dB".into()), None)
        .build();
    let registry = MockRegistry::single(0, dev);
    let value = get_value(None, false, &registry, 0, "/gain").await.expect("ok");
    assert_eq!(value, Value::String("0dB".into()));
}

// S2 — GetValue missing OID.
#[tokio::test]
async fn get_value_missing_oid() {
    let dev = DeviceBuilder::default().build();
    let registry = MockRegistry::single(0, dev);
    let err = get_value(None, false, &registry, 0, "/gain").await.unwrap_err();
    assert_eq!(err.code, StatusCode::NotFound);
    assert_eq!(err.message, "Oid does not exist");
}

// §4.8 — GetParam surfaces descriptor metadata beyond what GetValue returns.
#[tokio::test]
async fn get_param_includes_descriptor_metadata() {
    let dev = DeviceBuilder::default()
        .param("/gain", ParamKind::Scalar, Value::String("0dB".into()), None)
        .describe("/gain", vec!["/g".to_owned()], [("en".to_owned(), "Gain".to_owned())].into())
        .build();
    let registry = MockRegistry::single(0, dev);
    let detail = get_param(None, false, &registry, 0, "/gain").await.expect("ok");
    assert_eq!(detail.oid, "/gain");
    assert_eq!(detail.value, Value::String("0dB".into()));
    assert_eq!(detail.kind, ParamKind::Scalar);
    assert_eq!(detail.oid_aliases, vec!["/g".to_owned()]);
    assert_eq!(detail.display_strings.get("en"), Some(&"Gain".to_owned()));
}

#[tokio::test]
async fn get_param_missing_oid() {
    let dev = DeviceBuilder::default().build();
    let registry = MockRegistry::single(0, dev);
    let err = get_param(None, false, &registry, 0, "/gain").await.unwrap_err();
    assert_eq!(err.code, StatusCode::NotFound);
}

// S3 — subscription lifecycle via UpdateSubscriptions.
#[tokio::test]
async fn update_subscriptions_lifecycle() {
    let dev = DeviceBuilder::default()
        .param("/a", ParamKind::Scalar, Value::String("1".into()), None)
        .param("/b", ParamKind::Scalar, Value::String("2".into()), None)
        .build();
    let registry = MockRegistry::single(0, dev);
    let subs = SubscriptionManager::new(64);

    let added = update_subscriptions(
        None,
        false,
        &registry,
        0,
        vec!["/a".to_owned(), "/b".to_owned()],
        vec![],
        &subs,
    )
    .await
    .expect("first add");
    assert_eq!(added.len(), 2);

    let removed = update_subscriptions(None, false, &registry, 0, vec![], vec!["/a".to_owned()], &subs)
        .await
        .expect("remove a");
    assert!(removed.is_empty());
}

#[tokio::test]
async fn update_subscriptions_rejected_when_unsupported() {
    let dev = DeviceBuilder::default().subscriptions_supported(false).build();
    let registry = MockRegistry::single(0, dev);
    let subs = SubscriptionManager::new(64);
    let err = update_subscriptions(None, false, &registry, 0, vec![], vec![], &subs).await.unwrap_err();
    assert_eq!(err.code, StatusCode::FailedPrecondition);
}

// Invariant 9 — MultiSet atomicity: a failed commit surfaces no
// valueSetByClient event for any OID in the payload.
#[tokio::test]
async fn multi_set_value_failure_emits_no_events() {
    let dev = DeviceBuilder::default()
        .default_scope("st2138:adm")
        .param("/locked", ParamKind::Scalar, Value::String("old".into()), None)
        .build();
    let mut rx = dev.subscribe_value_set_by_client();
    let registry = MockRegistry::single(0, dev);

    let err = multi_set_value(
        Some(&read_only_token()),
        true,
        &registry,
        0,
        vec![("/locked".to_owned(), Value::String("new".into()))],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, StatusCode::PermissionDenied);
    assert!(rx.try_recv().is_err(), "no event should have been emitted");
}

#[tokio::test]
async fn multi_set_value_success_emits_events_and_commits() {
    let dev = wildcard_fixture_device();
    let registry = MockRegistry::single(0, dev);
    multi_set_value(
        Some(&monitor_token()),
        true,
        &registry,
        0,
        vec![("/test/param1".to_owned(), Value::String("zz".into()))],
    )
    .await
    .expect("commits");
    let value = get_value(None, false, &registry, 0, "/test/param1").await.expect("reads back");
    assert_eq!(value, Value::String("zz".into()));
}

// S6 — authz rejection before any device call.
#[tokio::test]
async fn authz_rejection_before_device_call() {
    let dev = wildcard_fixture_device();
    let registry = MockRegistry::single(0, dev);
    let err = get_value(Some("Bearer not-a-token"), true, &registry, 0, "/test/param1")
        .await
        .unwrap_err();
    assert_eq!(err.code, StatusCode::Unauthenticated);
    assert_eq!(err.message, "Invalid JWS Token");
}

#[tokio::test]
async fn execute_command_echoes_with_response() {
    let dev = DeviceBuilder::default().command("/reboot").build();
    let registry = MockRegistry::single(0, dev);
    let responses = execute_command(
        Some(&monitor_token()),
        true,
        &registry,
        0,
        "/reboot",
        Value::Bool(true),
        true,
    )
    .await
    .expect("executes");
    assert_eq!(responses, vec![CommandResponse::Response(Value::Bool(true))]);
}

#[tokio::test]
async fn execute_command_without_respond_yields_no_response() {
    let dev = DeviceBuilder::default().command("/reboot").build();
    let registry = MockRegistry::single(0, dev);
    let responses = execute_command(
        Some(&monitor_token()),
        true,
        &registry,
        0,
        "/reboot",
        Value::Bool(true),
        false,
    )
    .await
    .expect("executes");
    assert_eq!(responses, vec![CommandResponse::NoResponse]);
}

#[tokio::test]
async fn param_info_request_empty_device_is_not_found() {
    let dev = DeviceBuilder::default().build();
    let registry = MockRegistry::single(0, dev);
    let err = param_info_request(None, false, &registry, 0, None, false).await.unwrap_err();
    assert_eq!(err.code, StatusCode::NotFound);
}

#[tokio::test]
async fn param_info_request_recursive_walks_whole_tree() {
    let dev = wildcard_fixture_device();
    let registry = MockRegistry::single(0, dev);
    let entries = param_info_request(None, false, &registry, 0, Some("/test"), true)
        .await
        .expect("resolves");
    assert_eq!(entries.len(), 11); // /test plus its 10 descendants
    assert!(entries.iter().any(|e| e.oid == "/test/array" && e.array_length == Some(2)));
}

#[tokio::test]
async fn device_request_minimal_detail_level_filters_non_minimal_params() {
    let dev = DeviceBuilder::default()
        .param("/v", ParamKind::Scalar, Value::String("x".into()), None)
        .build();
    let registry = MockRegistry::single(0, dev);
    let entries =
        device_request(None, false, &registry, 0, DetailLevel::Minimal, vec![], None).await.expect("ok");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn device_request_full_detail_level_includes_everything() {
    let dev = wildcard_fixture_device();
    let registry = MockRegistry::single(0, dev);
    let entries =
        device_request(None, false, &registry, 0, DetailLevel::Full, vec![], None).await.expect("ok");
    assert_eq!(entries.len(), 11);
}
