// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Connect streaming dispatcher (C6): one long-lived server→client
//! stream per client, multiplexing value-change and language-pack signals
//! across every device in the slot map.

pub mod queue;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::authz::Authorizer;
use crate::device::{Device, DeviceRegistry, DetailLevel, LanguagePackEvent, Slot, Value, ValueChangeEvent};
use crate::status::{CatenaError, CatenaResult, StatusCode};
use crate::subscription::SubscriptionManager;
use queue::{Connection, ConnectionId, ConnectionQueue};

/// A single streamed event on the Connect RPC (§3, §6 `PushUpdates`).
#[derive(Debug, Clone)]
pub enum PushUpdate {
    SlotsAdded(Vec<Slot>),
    ValueChanged { slot: Slot, oid: String, value: Value },
    LanguagePackChanged { slot: Slot, pack: LanguagePackEvent },
}

/// §4.6.1 event-filtering table for value-change events. `subs` is `None`
/// when the device has subscriptions disabled, in which case the
/// `SUBSCRIPTIONS` row degrades to "minimal set only".
pub(crate) fn should_emit_value(
    detail_level: DetailLevel,
    dev: &dyn Device,
    oid: &str,
    minimal_set: bool,
    is_command: bool,
    subs: Option<&SubscriptionManager>,
    authz: &Authorizer,
) -> bool {
    let passes_detail = match detail_level {
        DetailLevel::Full => true,
        DetailLevel::Minimal => minimal_set,
        DetailLevel::Subscriptions => {
            minimal_set || subs.map(|s| s.is_subscribed(oid, dev, authz)).unwrap_or(false)
        }
        DetailLevel::Commands => is_command,
        DetailLevel::None | DetailLevel::Unset => false,
    };
    passes_detail
}

/// §4.6.1: language-pack events are emitted iff the authorizer can read the
/// device's default scope (the disabled sentinel always can).
fn should_emit_language(dev: &dyn Device, authz: &Authorizer) -> bool {
    authz.read_authz_scope(dev.default_scope())
}

struct SessionHandle {
    token: CancellationToken,
}

impl Connection for SessionHandle {
    fn cancel(&self) {
        self.token.cancel();
    }
}

/// Per-slot subscription state for one Connect session, used to evaluate
/// the `SUBSCRIPTIONS` detail-level row. Populated by `UpdateSubscriptions`
/// calls scoped to this session, or left empty if the device opts out
/// (`subscriptions_supported() == false`).
pub struct SessionSubscriptions {
    pub by_slot: std::collections::HashMap<Slot, Arc<SubscriptionManager>>,
}

impl SessionSubscriptions {
    pub fn new() -> Self {
        Self { by_slot: std::collections::HashMap::new() }
    }

    pub fn for_slot(&self, slot: Slot) -> Option<&SubscriptionManager> {
        self.by_slot.get(&slot).map(|m| m.as_ref())
    }
}

impl Default for SessionSubscriptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers a Connect session with the connection queue, emits the
/// mandatory initial `slots_added` update, and returns the stream the
/// transport crate forwards to the peer plus the id to deregister with on
/// teardown.
///
/// `priority` comes from the request's `force_connection` flag per §4.8.
/// `RESOURCE_EXHAUSTED` ("Too many connections to service") if the queue is
/// full and no lower-priority holder can be evicted.
pub fn connect(
    devices: Arc<dyn DeviceRegistry>,
    authz: Authorizer,
    detail_level: DetailLevel,
    priority: i32,
    subscriptions: Arc<SessionSubscriptions>,
    queue: Arc<ConnectionQueue>,
    shutdown: CancellationToken,
) -> CatenaResult<(ConnectionId, mpsc::Receiver<PushUpdate>)> {
    let token = shutdown.child_token();
    let handle: Arc<dyn Connection> = Arc::new(SessionHandle { token: token.clone() });
    let id = queue
        .register_connection(priority, handle)
        .ok_or_else(|| CatenaError::new(StatusCode::ResourceExhausted, "Too many connections to service"))?;

    let (tx, rx) = mpsc::channel(64);
    let slots = devices.populated_slots();
    // §8 invariant 8: slots_added precedes every other update.
    if tx.try_send(PushUpdate::SlotsAdded(slots.clone())).is_err() {
        warn!("Connect: failed to queue initial slots_added update");
    }

    for slot in slots {
        let Some(dev) = devices.get(slot) else { continue };
        spawn_fanout(slot, dev, authz.clone(), detail_level, subscriptions.clone(), tx.clone(), token.clone());
    }

    Ok((id, rx))
}

fn spawn_fanout(
    slot: Slot,
    dev: Arc<dyn Device>,
    authz: Authorizer,
    detail_level: DetailLevel,
    subscriptions: Arc<SessionSubscriptions>,
    tx: mpsc::Sender<PushUpdate>,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut client_rx = dev.subscribe_value_set_by_client();
        let mut server_rx = dev.subscribe_value_set_by_server();
        let mut lang_rx = dev.subscribe_language_added();

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                event = client_rx.recv() => {
                    if !handle_value_event(event, slot, &dev, detail_level, &subscriptions, &authz, &tx).await {
                        break;
                    }
                }
                event = server_rx.recv() => {
                    if !handle_value_event(event, slot, &dev, detail_level, &subscriptions, &authz, &tx).await {
                        break;
                    }
                }
                event = lang_rx.recv() => {
                    match event {
                        Ok(pack) => {
                            if should_emit_language(dev.as_ref(), &authz) {
                                let _ = tx.send(PushUpdate::LanguagePackChanged { slot, pack }).await;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    });
}

async fn handle_value_event(
    event: Result<ValueChangeEvent, tokio::sync::broadcast::error::RecvError>,
    slot: Slot,
    dev: &Arc<dyn Device>,
    detail_level: DetailLevel,
    subscriptions: &SessionSubscriptions,
    authz: &Authorizer,
    tx: &mpsc::Sender<PushUpdate>,
) -> bool {
    match event {
        Ok(change) => {
            let Ok(param) = dev.get_param(&change.oid) else { return true };
            if !authz.read_authz(param.as_ref(), dev.default_scope()) {
                return true;
            }
            let descriptor = param.descriptor();
            let emit = should_emit_value(
                detail_level,
                dev.as_ref(),
                &change.oid,
                descriptor.minimal_set(),
                descriptor.is_command(),
                subscriptions.for_slot(slot),
                authz,
            );
            if emit {
                let _ = tx
                    .send(PushUpdate::ValueChanged { slot, oid: change.oid, value: change.value })
                    .await;
            }
            true
        }
        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => true,
        Err(tokio::sync::broadcast::error::RecvError::Closed) => false,
    }
}

pub fn deregister(queue: &ConnectionQueue, id: ConnectionId) {
    queue.deregister_connection(id);
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
