use crate::discovery::types::NeighborSet;
use crate::ring::identity::{AddressScheme, NodeId};

use std::net::Ipv4Addr;

/// Everything the forwarding decision reads, captured at one instant.
pub struct RouteView<'a> {
    pub scheme: AddressScheme,
    pub self_id: NodeId,
    /// Known members in ascending order.
    pub members: &'a [NodeId],
    pub neighbors: &'a NeighborSet,
}

/// Picks the hop after this node for a packet received from `from`.
///
/// Forwarding keeps a packet moving in one direction around the sorted ring, so a
/// packet injected next to its originator passes every member once and then comes
/// back. Returns `None` when the packet cannot be placed: its sender is neither a
/// known member nor a direct neighbor.
pub fn resolve_next_hop(view: &RouteView<'_>, from: Ipv4Addr) -> Option<Ipv4Addr> {
    let own_addr = view.scheme.address(view.self_id);

    let next = match view.scheme.node_id(from) {
        Some(from_id) if view.members.binary_search(&from_id).is_ok() => {
            next_member(view.self_id, from_id, view.members).map(|hop| match hop {
                Hop::Member(id) => view.scheme.address(id),
                Hop::EchoBack => from,
            })
        }
        // Sender not in membership yet: pass it to the neighbor on the other side.
        _ => view.neighbors.other_than(&from),
    };

    next.filter(|addr| *addr != own_addr)
}

enum Hop {
    Member(NodeId),
    EchoBack,
}

fn next_member(self_id: NodeId, from_id: NodeId, members: &[NodeId]) -> Option<Hop> {
    match members.len() {
        0 => None,
        1 => Some(Hop::Member(members[0])),
        2 => {
            if members.contains(&self_id) {
                Some(Hop::EchoBack)
            } else {
                members
                    .iter()
                    .find(|&&id| id != from_id)
                    .map(|&id| Hop::Member(id))
            }
        }
        _ => {
            let mut ring = members.to_vec();
            if let Err(pos) = ring.binary_search(&self_id) {
                ring.insert(pos, self_id);
            }
            next_on_ring(self_id, from_id, &ring).map(Hop::Member)
        }
    }
}

/// Direction-preserving step on a ring of at least three members that includes `self_id`.
fn next_on_ring(self_id: NodeId, from_id: NodeId, ring: &[NodeId]) -> Option<NodeId> {
    let pos = ring.binary_search(&self_id).ok()?;
    let first = ring[0];
    let last = ring[ring.len() - 1];

    if self_id == first {
        if from_id == last {
            Some(ring[1])
        } else {
            Some(last)
        }
    } else if self_id == last {
        if from_id == first {
            Some(ring[ring.len() - 2])
        } else {
            Some(first)
        }
    } else if from_id > self_id {
        Some(ring[pos - 1])
    } else if from_id < self_id {
        Some(ring[pos + 1])
    } else {
        None
    }
}
