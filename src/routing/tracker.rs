use dashmap::DashMap;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Lifecycle of a packet this node originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BroadcastState {
    /// Handed to the first hop, travelling around the ring.
    Forwarding,
    /// Came back to this node after a full loop. Terminal.
    Returned,
}

#[derive(Debug, Clone)]
pub struct BroadcastRecord {
    pub first_hop: Ipv4Addr,
    pub state: BroadcastState,
    pub started: Instant,
}

/// Outstanding broadcasts keyed by trace id.
#[derive(Default)]
pub struct BroadcastTracker {
    records: DashMap<Uuid, BroadcastRecord>,
}

impl BroadcastTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, trace_id: Uuid, first_hop: Ipv4Addr) {
        self.records.insert(
            trace_id,
            BroadcastRecord {
                first_hop,
                state: BroadcastState::Forwarding,
                started: Instant::now(),
            },
        );
    }

    /// Marks a broadcast as returned. Returns the previous state, or `None` for a
    /// trace id this node does not know (e.g. issued before a restart).
    pub fn complete(&self, trace_id: &Uuid) -> Option<BroadcastState> {
        let mut record = self.records.get_mut(trace_id)?;
        let previous = record.state;
        record.state = BroadcastState::Returned;

        tracing::debug!(
            "Broadcast {} via {} returned after {:?}",
            trace_id,
            record.first_hop,
            record.started.elapsed()
        );

        Some(previous)
    }

    pub fn forget(&self, trace_id: &Uuid) {
        self.records.remove(trace_id);
    }

    pub fn state(&self, trace_id: &Uuid) -> Option<BroadcastState> {
        self.records.get(trace_id).map(|record| record.state)
    }

    pub fn outstanding(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.value().state == BroadcastState::Forwarding)
            .count()
    }

    /// Drops records older than `retention`, whatever their state.
    pub fn prune(&self, retention: Duration) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.started.elapsed() <= retention);
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
