use super::identity::{AddressScheme, NodeId};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single known ring member.
///
/// `last_seen` is refreshed every time the id shows up in a piggy-backed membership
/// list. It is informational only: entries are never expired by age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEntry {
    pub address: Ipv4Addr,
    pub last_seen: u64,
}

/// Local registry of known ring members, keyed and ordered by `NodeId`.
///
/// Backed by a `BTreeMap`, so every read sees the members in ring order without a
/// separate sort step after mutation.
#[derive(Debug, Clone, Default)]
pub struct RingMembership {
    scheme: AddressScheme,
    members: BTreeMap<NodeId, MembershipEntry>,
}

impl RingMembership {
    pub fn new(scheme: AddressScheme) -> Self {
        Self {
            scheme,
            members: BTreeMap::new(),
        }
    }

    /// Inserts every id, or refreshes its timestamp if it is already known.
    pub fn merge(&mut self, ids: &[NodeId]) {
        let now = unix_now();

        for &id in ids {
            let address = self.scheme.address(id);
            match self.members.get_mut(&id) {
                Some(entry) => entry.last_seen = now,
                None => {
                    tracing::info!("Discovered ring member {} at {}", id, address);
                    self.members.insert(
                        id,
                        MembershipEntry {
                            address,
                            last_seen: now,
                        },
                    );
                }
            }
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<MembershipEntry> {
        let removed = self.members.remove(&id);
        if removed.is_some() {
            tracing::info!("Removed ring member {} ({} left)", id, self.members.len());
        }
        removed
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains_key(&id)
    }

    /// Member ids in ascending ring order.
    pub fn sorted(&self) -> Vec<NodeId> {
        self.members.keys().copied().collect()
    }

    pub fn snapshot(&self) -> BTreeMap<NodeId, MembershipEntry> {
        self.members.clone()
    }
}

/// Hop count between `from` and `to` along a sorted ring, taking the shorter way round.
///
/// Returns `None` when either id is not part of `sorted`.
pub fn ring_distance(sorted: &[NodeId], from: NodeId, to: NodeId) -> Option<usize> {
    let i = sorted.binary_search(&from).ok()?;
    let j = sorted.binary_search(&to).ok()?;
    let direct = i.abs_diff(j);

    Some(direct.min(sorted.len() - direct))
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
