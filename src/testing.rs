//! In-memory stand-ins for the network edges, shared by the unit tests.

use crate::bridge::client::EventBridge;
use crate::bridge::types::BridgeMessage;
use crate::discovery::probe::Prober;
use crate::ring::identity::{AddressScheme, NodeId};
use crate::routing::packet::Packet;
use crate::routing::transport::PacketSender;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers probes for a fixed, replaceable set of addresses. Scripted answers for an
/// address are used up first, one per probe.
pub struct StaticProber {
    reachable: Mutex<HashSet<Ipv4Addr>>,
    scripted: Mutex<HashMap<Ipv4Addr, VecDeque<bool>>>,
    probes: AtomicUsize,
}

impl StaticProber {
    pub fn with_ids(ids: &[u8]) -> Self {
        let prober = Self {
            reachable: Mutex::new(HashSet::new()),
            scripted: Mutex::new(HashMap::new()),
            probes: AtomicUsize::new(0),
        };
        prober.set_reachable(ids);
        prober
    }

    pub fn set_reachable(&self, ids: &[u8]) {
        let scheme = AddressScheme::default();
        let addrs = ids
            .iter()
            .filter_map(|&n| NodeId::new(n))
            .map(|id| scheme.address(id))
            .collect();
        *self.reachable.lock().unwrap() = addrs;
    }

    pub fn script(&self, id: u8, answers: &[bool]) {
        let addr = AddressScheme::default().address(NodeId::new(id).unwrap());
        self.scripted
            .lock()
            .unwrap()
            .insert(addr, answers.iter().copied().collect());
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for StaticProber {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(answer) = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&addr)
            .and_then(VecDeque::pop_front)
        {
            return answer;
        }
        self.reachable.lock().unwrap().contains(&addr)
    }
}

/// Records every outbound packet instead of sending it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(Ipv4Addr, Packet)>>,
    fail_to: Mutex<HashSet<Ipv4Addr>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(Ipv4Addr, Packet)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_sends_to(&self, addr: Ipv4Addr) {
        self.fail_to.lock().unwrap().insert(addr);
    }
}

#[async_trait]
impl PacketSender for RecordingSender {
    async fn send(&self, addressee: Ipv4Addr, packet: &Packet) -> Result<()> {
        if self.fail_to.lock().unwrap().contains(&addressee) {
            return Err(anyhow::anyhow!("connection refused"));
        }
        self.sent.lock().unwrap().push((addressee, packet.clone()));
        Ok(())
    }
}

/// Keeps every published bridge message as JSON.
#[derive(Default)]
pub struct RecordingBridge {
    messages: Mutex<Vec<serde_json::Value>>,
}

impl RecordingBridge {
    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBridge for RecordingBridge {
    async fn send(&self, message: BridgeMessage) {
        let json = serde_json::to_value(&message).unwrap();
        self.messages.lock().unwrap().push(json);
    }
}
