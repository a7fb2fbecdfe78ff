// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Connect connection priority queue (§4.6.3).
//!
//! Backed by a `Vec`, not a `BinaryHeap`: eviction removes a specific
//! by-value entry (the lowest-priority holder), not the minimum repeatedly,
//! so a heap's reshuffling guarantees buy nothing here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A registered Connect session, as seen by the queue. `cancel` must be
/// lock-safe: it sets a flag and wakes the session's writer, nothing more.
pub trait Connection: Send + Sync {
    fn cancel(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

struct Entry {
    id: ConnectionId,
    priority: i32,
    conn: Arc<dyn Connection>,
}

/// Bounded at `max_connections`. `register_connection` evicts the lowest-
/// priority existing holder (ties broken by insertion order — the first
/// entry found scanning front-to-back) when full and the new connection
/// outranks it; otherwise registration is refused.
pub struct ConnectionQueue {
    max_connections: usize,
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl ConnectionQueue {
    pub fn new(max_connections: usize) -> Self {
        Self { max_connections, entries: Mutex::new(Vec::new()), next_id: AtomicU64::new(0) }
    }

    /// Registers `conn` at `priority`. Returns `None` ("Too many connections
    /// to service") if the queue is full and no lower-priority holder
    /// exists to evict.
    pub fn register_connection(
        &self,
        priority: i32,
        conn: Arc<dyn Connection>,
    ) -> Option<ConnectionId> {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.lock();

        if entries.len() >= self.max_connections {
            let victim_idx = entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.priority)
                .filter(|(_, e)| e.priority < priority)
                .map(|(idx, _)| idx)?;
            let victim = entries.remove(victim_idx);
            // Evicted outside the lock's critical invariant, but cancel()
            // is required to be lock-safe so calling it here is fine.
            victim.conn.cancel();
        }

        entries.push(Entry { id, priority, conn });
        Some(id)
    }

    pub fn deregister_connection(&self, id: ConnectionId) {
        self.entries.lock().retain(|e| e.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
