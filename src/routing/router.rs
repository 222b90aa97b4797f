//! Packet origination and the hop-by-hop forwarding loop.

use super::next_hop::{RouteView, resolve_next_hop};
use super::packet::{Packet, PacketBody};
use super::tracker::BroadcastTracker;
use super::transport::PacketSender;
use crate::bridge::client::EventBridge;
use crate::bridge::types::BridgeMessage;
use crate::ring::state::RingState;

use anyhow::Result;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// What happened to one inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Back at its originator; not forwarded.
    Returned,
    /// Passed on to the given hop.
    Forwarded(Ipv4Addr),
    /// No next hop could be resolved; dropped.
    Unroutable,
}

pub struct RingRouter {
    state: Arc<RingState>,
    sender: Arc<dyn PacketSender>,
    bridge: Arc<dyn EventBridge>,
    tracker: BroadcastTracker,
    unroutable: AtomicU64,
}

impl RingRouter {
    pub fn new(
        state: Arc<RingState>,
        sender: Arc<dyn PacketSender>,
        bridge: Arc<dyn EventBridge>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            sender,
            bridge,
            tracker: BroadcastTracker::new(),
            unroutable: AtomicU64::new(0),
        })
    }

    pub fn state(&self) -> &Arc<RingState> {
        &self.state
    }

    pub fn tracker(&self) -> &BroadcastTracker {
        &self.tracker
    }

    pub fn unroutable_count(&self) -> u64 {
        self.unroutable.load(Ordering::Relaxed)
    }

    /// Creates a packet on this node and sends it to `addressee`.
    pub async fn originate(&self, addressee: Ipv4Addr, body: PacketBody) -> Result<Uuid> {
        let trace_id = Uuid::new_v4();
        let packet = Packet {
            from: self.state.own_addr,
            to: addressee,
            sender_node: self.state.self_id,
            trace_id: Some(trace_id),
            body,
        };

        self.tracker.start(trace_id, addressee);
        if let Err(e) = self.sender.send(addressee, &packet).await {
            self.tracker.forget(&trace_id);
            return Err(e);
        }

        tracing::info!("Sent to {}: {:?}", addressee, packet.body);
        Ok(trace_id)
    }

    /// Originates a copy of `body` to each current neighbor. Returns how many
    /// sends succeeded.
    pub async fn broadcast(&self, body: PacketBody) -> usize {
        let neighbors = self.state.neighbors().await;
        let mut sent = 0;

        for &neighbor in neighbors.iter() {
            match self.originate(neighbor, body.clone()).await {
                Ok(_) => sent += 1,
                Err(e) => tracing::warn!("Failed to send to neighbor {}: {}", neighbor, e),
            }
        }

        sent
    }

    /// Consumes inbound packets until the channel closes.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<Packet>) {
        tracing::info!("Ring router started for node {}", self.state.self_id);

        while let Some(packet) = rx.recv().await {
            self.handle_packet(packet).await;
        }

        tracing::info!("Ring router stopped");
    }

    pub async fn handle_packet(&self, mut packet: Packet) -> RouteOutcome {
        let self_id = self.state.self_id;

        if packet.sender_node == self_id {
            if let Some(ids) = packet.membership_ids() {
                self.state.merge(ids).await;
            }
            if let Some(trace_id) = packet.trace_id {
                self.tracker.complete(&trace_id);
            }
            tracing::info!("Received own packet back from {}: {:?}", packet.from, packet.body);
            return RouteOutcome::Returned;
        }

        if let PacketBody::Membership { nodes_in_network } = &mut packet.body {
            if !nodes_in_network.contains(&self_id) {
                nodes_in_network.push(self_id);
            }
            self.state.merge(nodes_in_network).await;
        }

        let next_hop = {
            let (members, neighbors) = self.state.route_snapshot().await;
            let view = RouteView {
                scheme: self.state.scheme,
                self_id,
                members: &members,
                neighbors: &neighbors,
            };
            resolve_next_hop(&view, packet.from)
        };

        let Some(next_hop) = next_hop else {
            let dropped = self.unroutable.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                "No next hop for packet from {} (origin {}), dropped ({} so far)",
                packet.from,
                packet.sender_node,
                dropped
            );
            return RouteOutcome::Unroutable;
        };

        match &packet.body {
            PacketBody::Command { .. } => {
                self.bridge.send(BridgeMessage::Relay(packet.clone())).await;
            }
            PacketBody::Event(notice) => {
                tracing::info!(
                    "Node {} reports {:?} for {}",
                    packet.sender_node,
                    notice.event,
                    notice.neighbour_ip
                );
            }
            _ => {}
        }

        packet.readdress(self.state.own_addr, next_hop);
        tracing::debug!("Received and forwarded to {}: {:?}", next_hop, packet);

        if let Err(e) = self.sender.send(next_hop, &packet).await {
            tracing::warn!("Failed to forward packet to {}: {}", next_hop, e);
        }

        RouteOutcome::Forwarded(next_hop)
    }
}
