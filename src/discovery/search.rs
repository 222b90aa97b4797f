use super::probe::Prober;
use super::types::NeighborSet;
use crate::ring::identity::{AddressScheme, NodeId};

use rand::Rng;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// Directional nearest-neighbor search around this node's ring position.
pub struct NeighborDiscovery {
    scheme: AddressScheme,
    self_id: NodeId,
    prober: Arc<dyn Prober>,
    retry_delay: Duration,
}

impl NeighborDiscovery {
    pub fn new(
        scheme: AddressScheme,
        self_id: NodeId,
        prober: Arc<dyn Prober>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            scheme,
            self_id,
            prober,
            retry_delay,
        }
    }

    pub fn prober(&self) -> &Arc<dyn Prober> {
        &self.prober
    }

    /// Runs search rounds until at least one neighbor answers.
    ///
    /// Blocks (asynchronously) for as long as the node is alone: it cannot take part
    /// in the ring without a neighbor.
    pub async fn discover(&self) -> NeighborSet {
        tracing::info!("Searching for neighbors of node {}...", self.self_id);

        loop {
            let neighbors = self.search_once().await;
            if !neighbors.is_empty() {
                tracing::info!("Neighbors found: {:?}", neighbors.addresses());
                return neighbors;
            }

            tracing::warn!("No neighbors found, retrying");
            let jitter = rand::thread_rng().gen_range(0..=self.retry_delay.as_millis() as u64 / 4);
            tokio::time::sleep(self.retry_delay + Duration::from_millis(jitter)).await;
        }
    }

    /// A single round: both directions searched concurrently.
    pub async fn search_once(&self) -> NeighborSet {
        let (left, right) = tokio::join!(
            self.first_reachable(left_candidates(self.self_id)),
            self.first_reachable(right_candidates(self.self_id)),
        );

        NeighborSet::from_search(self.scheme.address(self.self_id), left, right)
    }

    async fn first_reachable(&self, candidates: impl Iterator<Item = NodeId>) -> Option<Ipv4Addr> {
        for id in candidates {
            let addr = self.scheme.address(id);
            if self.prober.probe(addr).await {
                return Some(addr);
            }
        }
        None
    }
}

/// Ids to the right of `self_id`: ascending to 255, then wrapping from 1.
pub fn right_candidates(self_id: NodeId) -> impl Iterator<Item = NodeId> {
    let own = self_id.get();
    NodeId::all()
        .filter(move |id| id.get() > own)
        .chain(NodeId::all().filter(move |id| id.get() < own))
}

/// Ids to the left of `self_id`: descending to 1, then wrapping from 255.
pub fn left_candidates(self_id: NodeId) -> impl Iterator<Item = NodeId> {
    let own = self_id.get();
    NodeId::all()
        .rev()
        .filter(move |id| id.get() < own)
        .chain(NodeId::all().rev().filter(move |id| id.get() > own))
}
