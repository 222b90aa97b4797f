use serde::Serialize;
use std::net::Ipv4Addr;

/// This node's current view of its immediate ring neighbors.
///
/// Holds at most two addresses, `[left, right]` when both exist, and never the
/// node's own address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NeighborSet(Vec<Ipv4Addr>);

impl NeighborSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a set from the result of a left/right search.
    ///
    /// When both sides found the same peer it is kept once. The own address is
    /// dropped from either side.
    pub fn from_search(
        own: Ipv4Addr,
        left: Option<Ipv4Addr>,
        right: Option<Ipv4Addr>,
    ) -> Self {
        let mut neighbors = Vec::with_capacity(2);

        for addr in [left, right].into_iter().flatten() {
            if addr != own && !neighbors.contains(&addr) {
                neighbors.push(addr);
            }
        }

        Self(neighbors)
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.0.iter()
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.0.contains(addr)
    }

    /// The neighbor on the opposite side from `addr`, if `addr` is a neighbor and
    /// there is a second one.
    pub fn other_than(&self, addr: &Ipv4Addr) -> Option<Ipv4Addr> {
        if !self.contains(addr) {
            return None;
        }
        self.0.iter().find(|n| *n != addr).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
