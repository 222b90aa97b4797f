use super::identity::{AddressScheme, NodeId};
use super::membership::{MembershipEntry, RingMembership};
use crate::discovery::types::NeighborSet;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use tokio::sync::RwLock;

/// Topology state shared by the router's packet loop and the liveness loop.
///
/// Lock order is always `membership` before `neighbors`.
pub struct RingState {
    pub scheme: AddressScheme,
    pub self_id: NodeId,
    pub own_addr: Ipv4Addr,
    membership: RwLock<RingMembership>,
    neighbors: RwLock<NeighborSet>,
}

impl RingState {
    pub fn new(scheme: AddressScheme, self_id: NodeId) -> Self {
        Self {
            scheme,
            self_id,
            own_addr: scheme.address(self_id),
            membership: RwLock::new(RingMembership::new(scheme)),
            neighbors: RwLock::new(NeighborSet::empty()),
        }
    }

    pub async fn merge(&self, ids: &[NodeId]) {
        self.membership.write().await.merge(ids);
    }

    pub async fn sorted_members(&self) -> Vec<NodeId> {
        self.membership.read().await.sorted()
    }

    pub async fn is_member(&self, id: NodeId) -> bool {
        self.membership.read().await.contains(id)
    }

    pub async fn snapshot(&self) -> BTreeMap<NodeId, MembershipEntry> {
        self.membership.read().await.snapshot()
    }

    pub async fn neighbors(&self) -> NeighborSet {
        self.neighbors.read().await.clone()
    }

    pub async fn set_neighbors(&self, neighbors: NeighborSet) {
        *self.neighbors.write().await = neighbors;
    }

    /// Members and neighbors read together, for a forwarding decision.
    pub async fn route_snapshot(&self) -> (Vec<NodeId>, NeighborSet) {
        let membership = self.membership.read().await;
        let neighbors = self.neighbors.read().await;
        (membership.sorted(), neighbors.clone())
    }

    /// Applies one liveness tick's outcome atomically: new neighbor set, gone
    /// members removed, back members merged.
    pub async fn apply_repair(&self, neighbors: NeighborSet, gone: &[NodeId], back: &[NodeId]) {
        let mut membership = self.membership.write().await;
        let mut current = self.neighbors.write().await;

        for &id in gone {
            membership.remove(id);
        }
        membership.merge(back);
        *current = neighbors;
    }
}
