// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S5 / invariant 8 (Connect's mandatory initial `slots_added` update),
//! exercised over the wire against the real `catena-server` binary's gRPC
//! binding.

use std::time::Duration;

use catena_specs::CatenaProcess;
use catena_transport::grpc::proto;
use catena_transport::grpc::proto::push_updates::Kind;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn s5_connect_initial_slot_list() -> anyhow::Result<()> {
    let server = CatenaProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;

    let mut client = server.grpc_client().await?;
    let request = proto::ConnectPayload {
        slots: vec![],
        language: String::new(),
        detail_level: proto::DetailLevel::Full as i32,
        user_agent: "catena-specs".into(),
        force_connection: false,
    };
    let mut stream = client.connect(request).await?.into_inner();

    let first = tokio::time::timeout(TIMEOUT, tokio_stream::StreamExt::next(&mut stream))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Connect stream ended before any message"))??;

    match first.kind {
        Some(Kind::SlotsAdded(proto::SlotList { slots })) => assert_eq!(slots, vec![0, 1]),
        other => anyhow::bail!("expected slots_added as the first Connect message, got {other:?}"),
    }

    // No further update is queued until a device signal fires.
    let second =
        tokio::time::timeout(Duration::from_millis(300), tokio_stream::StreamExt::next(&mut stream)).await;
    assert!(second.is_err(), "Connect produced a second update with no device signal");

    Ok(())
}

#[tokio::test]
async fn grpc_get_value_happy_path() -> anyhow::Result<()> {
    let server = CatenaProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;

    let mut client = server.grpc_client().await?;
    let resp =
        client.get_value(proto::GetValueRequest { slot: 0, oid: "/gain".into() }).await?.into_inner();

    match resp.value.and_then(|v| v.kind) {
        Some(proto::value::Kind::Float32Value(f)) => assert_eq!(f, 0.0),
        other => anyhow::bail!("expected a float32 value, got {other:?}"),
    }

    Ok(())
}
