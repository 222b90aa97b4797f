use super::adoption::select_back_neighbors;
use crate::bridge::client::EventBridge;
use crate::bridge::types::BridgeMessage;
use crate::discovery::search::NeighborDiscovery;
use crate::discovery::types::NeighborSet;
use crate::ring::identity::NodeId;
use crate::ring::state::RingState;
use crate::routing::packet::{PacketBody, TopologyEvent, TopologyNotice};
use crate::routing::router::RingRouter;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one monitoring tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub gone: Vec<Ipv4Addr>,
    pub back: Vec<Ipv4Addr>,
    pub neighbors: NeighborSet,
}

pub struct LivenessMonitor {
    state: Arc<RingState>,
    discovery: Arc<NeighborDiscovery>,
    router: Arc<RingRouter>,
    bridge: Arc<dyn EventBridge>,
    interval: Duration,
    broadcast_retention: Duration,
}

impl LivenessMonitor {
    pub fn new(
        state: Arc<RingState>,
        discovery: Arc<NeighborDiscovery>,
        router: Arc<RingRouter>,
        bridge: Arc<dyn EventBridge>,
        interval: Duration,
        broadcast_retention: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            discovery,
            router,
            bridge,
            interval,
            broadcast_retention,
        })
    }

    /// Ticks forever at the configured interval.
    pub async fn run(self: Arc<Self>) {
        tracing::info!("Liveness monitor started (every {:?})", self.interval);

        loop {
            let report = self.tick().await;
            if !report.gone.is_empty() || !report.back.is_empty() {
                tracing::info!(
                    "Topology repaired: gone={:?} back={:?} neighbors={:?}",
                    report.gone,
                    report.back,
                    report.neighbors.addresses()
                );
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    /// Probes every current neighbor and returns those that did not answer.
    pub async fn check_gone_neighbors(&self, neighbors: &NeighborSet) -> Vec<Ipv4Addr> {
        let prober = self.discovery.prober();
        let mut gone = Vec::new();

        for &neighbor in neighbors.iter() {
            if !prober.probe(neighbor).await {
                tracing::warn!("Neighbor {} stopped responding", neighbor);
                gone.push(neighbor);
            }
        }

        gone
    }

    pub async fn tick(&self) -> TickReport {
        let current = self.state.neighbors().await;

        if current.is_empty() {
            tracing::info!("No neighbors, searching...");
            let found = self.discovery.discover().await;
            self.state.set_neighbors(found.clone()).await;
            self.bridge
                .send(BridgeMessage::neighbors(found.addresses()))
                .await;
            return TickReport {
                neighbors: found,
                ..TickReport::default()
            };
        }

        let mut gone = self.check_gone_neighbors(&current).await;
        let candidates = self.discovery.discover().await;
        let changed = candidates != current;

        if changed && gone.is_empty() {
            // Candidates moved but every probe passed: look once more before trusting it.
            gone = self.check_gone_neighbors(&current).await;
        }
        // A neighbor rediscovered this tick is reachable after all.
        gone.retain(|addr| !candidates.contains(addr));

        let back = if changed {
            let known = self.state.sorted_members().await;
            select_back_neighbors(
                self.state.scheme,
                self.state.self_id,
                current.addresses(),
                candidates.addresses(),
                &known,
            )
        } else {
            Vec::new()
        };

        for &addr in &back {
            self.announce(TopologyEvent::NeighbourBack, addr).await;
        }

        let gone_ids = self.node_ids(&gone);
        let back_ids = self.node_ids(&back);
        self.state
            .apply_repair(candidates.clone(), &gone_ids, &back_ids)
            .await;

        if changed {
            self.bridge
                .send(BridgeMessage::neighbors(candidates.addresses()))
                .await;
        }

        for &addr in &gone {
            self.announce(TopologyEvent::NeighbourGone, addr).await;
        }

        let pruned = self.router.tracker().prune(self.broadcast_retention);
        if pruned > 0 {
            tracing::debug!("Pruned {} broadcast records", pruned);
        }

        TickReport {
            gone,
            back,
            neighbors: candidates,
        }
    }

    /// Tells the neighbors and the bridge about a topology change.
    async fn announce(&self, event: TopologyEvent, neighbour_ip: Ipv4Addr) {
        let Some(neighbour_node) = self.state.scheme.node_id(neighbour_ip) else {
            tracing::error!("Neighbor {} has no ring position", neighbour_ip);
            return;
        };
        let notice = TopologyNotice {
            event,
            neighbour_ip,
            neighbour_node,
        };

        self.router.broadcast(PacketBody::Event(notice)).await;
        self.bridge.send(BridgeMessage::Event(notice)).await;
    }

    fn node_ids(&self, addrs: &[Ipv4Addr]) -> Vec<NodeId> {
        addrs
            .iter()
            .filter_map(|&addr| self.state.scheme.node_id(addr))
            .collect()
    }
}
