// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S3 (subscription lifecycle) and S4 (wildcard expansion under authz),
//! exercised directly against the in-memory mock `Device` rather than a
//! spawned process — these are core-logic scenarios, not wire-protocol
//! ones.

use catena_core::authz::Authorizer;
use catena_core::device::{Device, DeviceRegistry, ParamKind, Value};
use catena_core::rpc::handlers::update_subscriptions;
use catena_core::subscription::SubscriptionManager;
use catena_core::testing::{wildcard_fixture_device, DeviceBuilder, MockRegistry};
use catena_specs::make_token;

#[tokio::test]
async fn s3_subscription_lifecycle() -> anyhow::Result<()> {
    let dev = DeviceBuilder::default()
        .param("/a", ParamKind::Scalar, Value::String("alpha".into()), None)
        .param("/b", ParamKind::Scalar, Value::String("beta".into()), None)
        .build();
    let registry = MockRegistry::single(0, dev);
    let subs = SubscriptionManager::new(64);

    let added =
        update_subscriptions(None, false, &registry, 0, vec!["/a".into(), "/b".into()], vec![], &subs).await?;
    assert_eq!(added.len(), 2);

    let dev = registry.get(0).ok_or_else(|| anyhow::anyhow!("slot 0 missing"))?;
    let authz = Authorizer::disabled();
    assert_eq!(dev.get_value("/a", &authz).await?, Value::String("alpha".into()));

    let removed = update_subscriptions(None, false, &registry, 0, vec![], vec!["/a".into()], &subs).await?;
    assert!(removed.is_empty());

    assert!(!subs.is_subscribed("/a", dev.as_ref(), &authz));
    assert!(subs.is_subscribed("/b", dev.as_ref(), &authz));

    Ok(())
}

#[tokio::test]
async fn s4_wildcard_expansion_under_authz() -> anyhow::Result<()> {
    let dev = wildcard_fixture_device();
    let authz = Authorizer::new(&make_token("st2138:mon", 0))?;
    let subs = SubscriptionManager::new(dev.max_subscriptions());

    subs.add_subscription("/test/*", &dev, &authz)?;

    let oids = subs.get_all_subscribed_oids(&dev, &authz);
    // `expand_root` walks every descendant beneath `/test` (not `/test`
    // itself), and an array param is expanded into its elements rather than
    // named in its own right: param1, basic (+param2), basic/deeper
    // (+param3), array/0 (+subparam), array/1 (+subparam) = 9.
    assert_eq!(oids.len(), 9);
    assert!(oids.contains("/test/param1"));
    assert!(oids.contains("/test/array/0/subparam"));
    assert!(!oids.contains("/test"));
    assert!(!oids.contains("/test/array"));

    subs.remove_subscription("/test/*")?;
    assert!(subs.get_all_subscribed_oids(&dev, &authz).is_empty());

    Ok(())
}
