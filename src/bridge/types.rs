use crate::ring::identity::NodeId;
use crate::ring::membership::MembershipEntry;
use crate::routing::packet::{Packet, TopologyNotice};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub const ENDPOINT_COMMAND: &str = "/command";
pub const ENDPOINT_STATUS: &str = "/status";

/// Payloads this node publishes to the outside world.
///
/// Serialized without a wrapper, so each variant is the bare JSON object the
/// consumer expects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BridgeMessage {
    /// `{"command": "neighbors", "neighbors": [...]}`
    Neighbors {
        command: &'static str,
        neighbors: Vec<Ipv4Addr>,
    },
    /// `{"all_nodes": {"<id>": {"address", "last_seen"}}}`
    AllNodes {
        all_nodes: BTreeMap<NodeId, MembershipEntry>,
    },
    Event(TopologyNotice),
    /// A command packet passing through this node, forwarded whole.
    Relay(Packet),
}

impl BridgeMessage {
    pub fn neighbors(neighbors: &[Ipv4Addr]) -> Self {
        Self::Neighbors {
            command: "neighbors",
            neighbors: neighbors.to_vec(),
        }
    }
}

/// Inbound command to distribute around the ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Number of neighbors the command was handed to.
    pub sent_to: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub node: NodeId,
    pub address: Ipv4Addr,
    pub neighbors: Vec<Ipv4Addr>,
    pub all_nodes: BTreeMap<NodeId, MembershipEntry>,
    pub unroutable: u64,
    pub outstanding_broadcasts: usize,
}
