use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::num::NonZeroU8;

/// Position of a node on the ring.
///
/// Valid ids are exactly `1..=255`; zero has no representation. Ordering follows the
/// numeric value, and the ring wraps from 255 back to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(NonZeroU8);

impl NodeId {
    pub fn new(raw: u8) -> Option<Self> {
        NonZeroU8::new(raw).map(Self)
    }

    pub fn get(self) -> u8 {
        self.0.get()
    }

    /// Every valid id in ascending order.
    pub fn all() -> impl DoubleEndedIterator<Item = NodeId> {
        (1..=u8::MAX).filter_map(NodeId::new)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps node ids to addresses and back.
///
/// Node addresses are `<a>.<b>.<id>.1`. The two leading octets are fixed per
/// deployment (`10.20` in production); tests run on loopback with `127.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressScheme {
    prefix: [u8; 2],
}

impl AddressScheme {
    pub const fn new(a: u8, b: u8) -> Self {
        Self { prefix: [a, b] }
    }

    pub fn prefix(&self) -> [u8; 2] {
        self.prefix
    }

    /// Extracts the ring position from an address. Addresses outside the prefix,
    /// or whose third octet is zero, are not ring members.
    pub fn node_id(&self, addr: Ipv4Addr) -> Option<NodeId> {
        let [a, b, id, _] = addr.octets();
        if [a, b] != self.prefix {
            return None;
        }
        NodeId::new(id)
    }

    pub fn address(&self, id: NodeId) -> Ipv4Addr {
        Ipv4Addr::new(self.prefix[0], self.prefix[1], id.get(), 1)
    }
}

impl Default for AddressScheme {
    fn default() -> Self {
        Self::new(10, 20)
    }
}
