// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state wiring a `DeviceRegistry` to both the gRPC and HTTP
//! bindings, generalizing the teacher's single `Arc<Store>` shared between
//! `transport/grpc` and `transport/http`.

use std::collections::HashMap;
use std::sync::Arc;

use catena_core::connect::queue::ConnectionQueue;
use catena_core::connect::SessionSubscriptions;
use catena_core::device::{DeviceRegistry, Slot};
use catena_core::subscription::SubscriptionManager;
use tokio_util::sync::CancellationToken;

/// Per-slot subscription state shared by every session this process
/// serves. The core's `SubscriptionManager` is connection-scoped by
/// design, but a transport process has no notion of a "session" spanning
/// the unary `UpdateSubscriptions` RPC and a long-lived `Connect` stream,
/// so one instance per populated slot is shared across all callers here —
/// mirroring how the teacher shares one `Arc<Store>` process-wide rather
/// than one per connection.
pub struct Subscriptions {
    by_slot: HashMap<Slot, Arc<SubscriptionManager>>,
}

impl Subscriptions {
    pub fn build(registry: &dyn DeviceRegistry) -> Self {
        let mut by_slot = HashMap::new();
        for slot in registry.populated_slots() {
            if let Some(dev) = registry.get(slot) {
                by_slot.insert(slot, Arc::new(SubscriptionManager::new(dev.max_subscriptions())));
            }
        }
        Self { by_slot }
    }

    pub fn get(&self, slot: Slot) -> Option<&Arc<SubscriptionManager>> {
        self.by_slot.get(&slot)
    }

    pub fn as_session_subscriptions(&self) -> Arc<SessionSubscriptions> {
        let mut session = SessionSubscriptions::new();
        for (slot, mgr) in &self.by_slot {
            session.by_slot.insert(*slot, mgr.clone());
        }
        Arc::new(session)
    }
}

/// The state object both `grpc::CatenaGrpc` and the HTTP router's
/// `State<Arc<ServiceState>>` hold a handle to.
pub struct ServiceState {
    pub registry: Arc<dyn DeviceRegistry>,
    pub authz_enabled: bool,
    pub subscriptions: Subscriptions,
    pub queue: Arc<ConnectionQueue>,
    pub shutdown: CancellationToken,
}

impl ServiceState {
    pub fn new(registry: Arc<dyn DeviceRegistry>, authz_enabled: bool, max_connections: usize) -> Arc<Self> {
        let subscriptions = Subscriptions::build(registry.as_ref());
        Arc::new(Self {
            registry,
            authz_enabled,
            subscriptions,
            queue: Arc::new(ConnectionQueue::new(max_connections)),
            shutdown: CancellationToken::new(),
        })
    }
}
