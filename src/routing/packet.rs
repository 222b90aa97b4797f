//! Wire format for ring traffic.
//!
//! A packet is a shared routing header plus exactly one body. The body carries an
//! explicit `kind` discriminant and is flattened into the same JSON object as the
//! header, so a membership packet looks like:
//!
//! ```json
//! {"from":"10.20.1.1","to":"10.20.5.1","sender_node":1,
//!  "trace_id":"…","kind":"membership","nodes_in_network":[1]}
//! ```

use crate::ring::identity::NodeId;

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Address of the hop that sent this copy. Rewritten at every hop.
    pub from: Ipv4Addr,
    /// Address of the hop this copy was sent to. Rewritten at every hop.
    pub to: Ipv4Addr,
    /// Node that created the packet. Never changes en route.
    pub sender_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Uuid>,
    #[serde(flatten)]
    pub body: PacketBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PacketBody {
    /// Membership announcement; every hop appends its own id.
    Membership { nodes_in_network: Vec<NodeId> },
    /// Application command relayed to the bridge at every hop.
    Command {
        command: String,
        #[serde(default)]
        message: serde_json::Value,
    },
    /// Topology change seen by the originating node.
    Event(TopologyNotice),
    /// Opaque payload, routed but not interpreted.
    Data {
        #[serde(default)]
        message: serde_json::Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyEvent {
    NeighbourGone,
    NeighbourBack,
}

/// A neighbor leaving or (re)joining next to the originating node.
///
/// Also sent to the bridge as-is, so it serializes as a flat
/// `{event, neighbour_ip, neighbour_node}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyNotice {
    pub event: TopologyEvent,
    pub neighbour_ip: Ipv4Addr,
    pub neighbour_node: NodeId,
}

impl Packet {
    pub fn membership_ids(&self) -> Option<&[NodeId]> {
        match &self.body {
            PacketBody::Membership { nodes_in_network } => Some(nodes_in_network),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self.body, PacketBody::Command { .. })
    }

    /// Points the packet at its next hop.
    pub fn readdress(&mut self, from: Ipv4Addr, to: Ipv4Addr) {
        self.from = from;
        self.to = to;
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}
