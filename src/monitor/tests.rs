//! Monitor Module Tests
//!
//! ## Test Scopes
//! - **Adoption Rules**: Each row of the back-neighbor decision table.
//! - **Ticks**: Gone and back scenarios end to end against an in-memory prober, checking
//!   membership, the neighbor set, the events sent around the ring and the bridge output.

#[cfg(test)]
mod tests {
    use crate::bridge::client::EventBridge;
    use crate::discovery::search::NeighborDiscovery;
    use crate::discovery::types::NeighborSet;
    use crate::monitor::adoption::select_back_neighbors;
    use crate::monitor::liveness::LivenessMonitor;
    use crate::ring::identity::{AddressScheme, NodeId};
    use crate::ring::state::RingState;
    use crate::routing::packet::PacketBody;
    use crate::routing::router::RingRouter;
    use crate::testing::{RecordingBridge, RecordingSender, StaticProber};
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::time::Duration;

    fn id(n: u8) -> NodeId {
        NodeId::new(n).unwrap()
    }

    fn ids(raw: &[u8]) -> Vec<NodeId> {
        raw.iter().map(|&n| id(n)).collect()
    }

    fn addr(n: u8) -> Ipv4Addr {
        AddressScheme::default().address(id(n))
    }

    fn addrs(raw: &[u8]) -> Vec<Ipv4Addr> {
        raw.iter().map(|&n| addr(n)).collect()
    }

    fn back(self_id: u8, current: &[u8], candidates: &[u8], known: &[u8]) -> Vec<Ipv4Addr> {
        select_back_neighbors(
            AddressScheme::default(),
            id(self_id),
            &addrs(current),
            &addrs(candidates),
            &ids(known),
        )
    }

    // ============================================================
    // ADOPTION RULE TESTS
    // ============================================================

    #[test]
    fn test_one_current_one_candidate_adopts_any_different_peer() {
        // 8 sits closer to 5 than 10 on the ring 1-5-8-10-15
        assert_eq!(back(5, &[10], &[8], &[1, 5, 10, 15]), addrs(&[8]));
        // even a farther one replaces the sole neighbor
        assert_eq!(back(5, &[8], &[10], &[1, 5, 8, 10, 15]), addrs(&[10]));
        assert!(back(5, &[8], &[8], &[1, 5, 8]).is_empty());
    }

    #[test]
    fn test_two_current_two_candidates_pairwise() {
        // left 1 stays, right 10 -> 8 is closer
        assert_eq!(back(5, &[1, 10], &[1, 8], &[1, 5, 10, 15, 20]), addrs(&[8]));
        // right candidate farther: nothing adopted
        assert!(back(5, &[1, 8], &[1, 10], &[1, 5, 8, 10]).is_empty());
        // both sides closer
        assert_eq!(
            back(50, &[10, 90], &[40, 60], &[10, 50, 90]),
            addrs(&[40, 60])
        );
    }

    #[test]
    fn test_two_current_one_candidate() {
        // candidate 7 strictly closer than 10
        assert_eq!(back(5, &[1, 10], &[7], &[1, 5, 10, 20]), addrs(&[7]));
        // candidate is a current neighbor: never "back"
        assert!(back(5, &[1, 10], &[10], &[1, 5, 10]).is_empty());
        // candidate farther than both current neighbors
        assert!(back(5, &[4, 6], &[30], &[1, 4, 5, 6, 30, 40, 50, 60]).is_empty());
    }

    #[test]
    fn test_one_current_two_candidates() {
        // current 20 is three hops away; 3 and 7 are one hop each
        assert_eq!(
            back(5, &[20], &[3, 7], &[1, 5, 10, 20]),
            addrs(&[3, 7])
        );
        // tied but different address is adopted, the current one is not
        assert_eq!(back(5, &[7], &[3, 7], &[5, 7]), addrs(&[3]));
    }

    #[test]
    fn test_new_candidates_count_in_the_ring() {
        // 8 is not a known member yet; it must still get a distance
        assert_eq!(back(5, &[1, 10], &[1, 8], &[1, 5, 10]), addrs(&[8]));
    }

    #[test]
    fn test_no_current_neighbors() {
        assert!(back(5, &[], &[1, 10], &[1, 5, 10]).is_empty());
    }

    // ============================================================
    // TICK TESTS
    // ============================================================

    struct Harness {
        monitor: Arc<LivenessMonitor>,
        state: Arc<RingState>,
        prober: Arc<StaticProber>,
        sender: Arc<RecordingSender>,
        bridge: Arc<RecordingBridge>,
    }

    async fn harness(self_id: u8, reachable: &[u8], members: &[u8], neighbors: &[u8]) -> Harness {
        let scheme = AddressScheme::default();
        let state = Arc::new(RingState::new(scheme, id(self_id)));
        state.merge(&ids(members)).await;
        state
            .set_neighbors(NeighborSet::from_search(
                addr(self_id),
                neighbors.first().map(|&n| addr(n)),
                neighbors.get(1).map(|&n| addr(n)),
            ))
            .await;

        let prober = Arc::new(StaticProber::with_ids(reachable));
        let sender = Arc::new(RecordingSender::default());
        let bridge = Arc::new(RecordingBridge::default());
        let discovery = Arc::new(NeighborDiscovery::new(
            scheme,
            id(self_id),
            prober.clone(),
            Duration::from_millis(5),
        ));
        let router = RingRouter::new(
            state.clone(),
            sender.clone(),
            bridge.clone() as Arc<dyn EventBridge>,
        );
        let monitor = LivenessMonitor::new(
            state.clone(),
            discovery,
            router,
            bridge.clone(),
            Duration::from_millis(10),
            Duration::from_secs(60),
        );

        Harness {
            monitor,
            state,
            prober,
            sender,
            bridge,
        }
    }

    #[tokio::test]
    async fn test_check_gone_neighbors() {
        let h = harness(5, &[1], &[1, 5, 10], &[1, 10]).await;

        let gone = h
            .monitor
            .check_gone_neighbors(&h.state.neighbors().await)
            .await;

        assert_eq!(gone, addrs(&[10]));
    }

    #[tokio::test]
    async fn test_tick_removes_gone_neighbor() {
        // ARRANGE: 10 goes silent, 15 is the next node to the right
        let h = harness(5, &[1, 10, 15], &[1, 5, 10, 15], &[1, 10]).await;
        h.prober.set_reachable(&[1, 15]);

        // ACT
        let report = h.monitor.tick().await;

        // ASSERT: 10 is gone and no longer a member, 15 took its place
        assert_eq!(report.gone, addrs(&[10]));
        assert!(report.back.is_empty());
        assert_eq!(h.state.neighbors().await.addresses(), &addrs(&[1, 15])[..]);
        assert_eq!(h.state.sorted_members().await, ids(&[1, 5, 15]));

        // the gone event went to both new neighbors and the bridge
        let events: Vec<_> = h
            .sender
            .sent()
            .into_iter()
            .filter(|(_, p)| matches!(p.body, PacketBody::Event(_)))
            .map(|(to, _)| to)
            .collect();
        assert_eq!(events, addrs(&[1, 15]));

        let messages = h.bridge.messages();
        assert!(messages.iter().any(|m| m["event"] == "neighbour_gone"
            && m["neighbour_ip"] == "10.20.10.1"
            && m["neighbour_node"] == 10));
        assert!(messages.iter().any(|m| m["command"] == "neighbors"));
    }

    #[tokio::test]
    async fn test_tick_adopts_back_neighbor() {
        // ARRANGE: single neighbor 10, node 8 just came up between us
        let h = harness(5, &[8, 10], &[1, 5, 10, 15], &[10]).await;

        // ACT
        let report = h.monitor.tick().await;

        // ASSERT: right search now stops at 8, left search wraps around to 10
        assert!(report.gone.is_empty());
        assert_eq!(report.back, addrs(&[8]));
        assert_eq!(h.state.neighbors().await.addresses(), &addrs(&[10, 8])[..]);
        assert!(h.state.is_member(id(8)).await);

        // the back event went to the previous neighbor
        let sent = h.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, addr(10));
        match &sent[0].1.body {
            PacketBody::Event(notice) => assert_eq!(notice.neighbour_node, id(8)),
            other => panic!("Expected an event, got {:?}", other),
        }

        let messages = h.bridge.messages();
        assert!(messages.iter().any(|m| m["event"] == "neighbour_back"));
        assert!(messages.iter().all(|m| m["event"] != "neighbour_gone"));
    }

    #[tokio::test]
    async fn test_tick_rechecks_when_candidates_move() {
        // ARRANGE: 10 answers the first liveness probe, then goes silent;
        // discovery meanwhile finds 8 on the right
        let h = harness(5, &[1, 8], &[1, 5, 10], &[1, 10]).await;
        h.prober.script(10, &[true]);

        // ACT
        let report = h.monitor.tick().await;

        // ASSERT: the second pass caught 10, and 8 came in closer
        assert_eq!(report.gone, addrs(&[10]));
        assert_eq!(report.back, addrs(&[8]));
        assert_eq!(h.state.neighbors().await.addresses(), &addrs(&[1, 8])[..]);
        assert_eq!(h.state.sorted_members().await, ids(&[1, 5, 8]));

        let messages = h.bridge.messages();
        assert!(messages.iter().any(|m| m["event"] == "neighbour_gone" && m["neighbour_node"] == 10));
        assert!(messages.iter().any(|m| m["event"] == "neighbour_back" && m["neighbour_node"] == 8));
    }

    #[tokio::test]
    async fn test_tick_keeps_neighbor_rediscovered_after_missed_probe() {
        // ARRANGE: 10 misses the liveness probe but answers again during discovery
        let h = harness(5, &[1, 10], &[1, 5, 10], &[1, 10]).await;
        h.prober.script(10, &[false]);

        // ACT
        let report = h.monitor.tick().await;

        // ASSERT: nothing is reported gone and the ring is untouched
        assert!(report.gone.is_empty());
        assert!(report.back.is_empty());
        assert_eq!(h.state.neighbors().await.addresses(), &addrs(&[1, 10])[..]);
        assert_eq!(h.state.sorted_members().await, ids(&[1, 5, 10]));
        assert!(h.sender.sent().is_empty());
        assert!(h.bridge.messages().is_empty());
    }

    #[tokio::test]
    async fn test_tick_without_changes_is_quiet() {
        let h = harness(5, &[1, 10], &[1, 5, 10], &[1, 10]).await;

        let report = h.monitor.tick().await;

        assert!(report.gone.is_empty());
        assert!(report.back.is_empty());
        assert_eq!(h.state.sorted_members().await, ids(&[1, 5, 10]));
        assert!(h.sender.sent().is_empty());
        assert!(h.bridge.messages().is_empty());
    }

    #[tokio::test]
    async fn test_tick_with_no_neighbors_rediscovers() {
        let h = harness(5, &[2, 9], &[], &[]).await;

        let report = h.monitor.tick().await;

        assert_eq!(report.neighbors.addresses(), &addrs(&[2, 9])[..]);
        assert_eq!(h.state.neighbors().await.addresses(), &addrs(&[2, 9])[..]);

        let messages = h.bridge.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["command"], "neighbors");
        assert_eq!(messages[0]["neighbors"], serde_json::json!(["10.20.2.1", "10.20.9.1"]));
    }
}
