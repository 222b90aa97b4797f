use crate::bridge::client::{EventBridge, HttpBridge, LogBridge};
use crate::bridge::handlers;
use crate::bridge::types::BridgeMessage;
use crate::config::NodeConfig;
use crate::discovery::probe::{Prober, TcpProber, serve_ping};
use crate::discovery::search::NeighborDiscovery;
use crate::monitor::liveness::LivenessMonitor;
use crate::ring::state::RingState;
use crate::routing::packet::PacketBody;
use crate::routing::router::RingRouter;
use crate::routing::transport::{PacketSender, TcpPacketSender, accept_loop};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const INBOUND_QUEUE: usize = 1024;

pub struct NodeCoordinator {
    config: NodeConfig,
    state: Arc<RingState>,
    discovery: Arc<NeighborDiscovery>,
    router: Arc<RingRouter>,
    monitor: Arc<LivenessMonitor>,
    bridge: Arc<dyn EventBridge>,
}

impl NodeCoordinator {
    /// Builds a node with the real TCP prober, TCP sender and the configured bridge.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let prober: Arc<dyn Prober> = Arc::new(TcpProber::new(
            config.node_ip,
            config.ping_port,
            config.probe_timeout,
        ));
        let sender: Arc<dyn PacketSender> =
            Arc::new(TcpPacketSender::new(config.ring_port, config.send_timeout));
        let bridge: Arc<dyn EventBridge> = match &config.bridge_url {
            Some(url) => {
                tracing::info!("Publishing to bridge at {}", url);
                Arc::new(HttpBridge::new(url.clone()))
            }
            None => Arc::new(LogBridge),
        };

        Self::with_parts(config, prober, sender, bridge)
    }

    pub fn with_parts(
        config: NodeConfig,
        prober: Arc<dyn Prober>,
        sender: Arc<dyn PacketSender>,
        bridge: Arc<dyn EventBridge>,
    ) -> Result<Self> {
        let self_id = config.node_id()?;
        let state = Arc::new(RingState::new(config.scheme, self_id));
        let discovery = Arc::new(NeighborDiscovery::new(
            config.scheme,
            self_id,
            prober,
            config.discovery_retry,
        ));
        let router = RingRouter::new(state.clone(), sender, bridge.clone());
        let monitor = LivenessMonitor::new(
            state.clone(),
            discovery.clone(),
            router.clone(),
            bridge.clone(),
            config.monitor_interval,
            config.broadcast_retention,
        );

        Ok(Self {
            config,
            state,
            discovery,
            router,
            monitor,
            bridge,
        })
    }

    pub fn state(&self) -> &Arc<RingState> {
        &self.state
    }

    pub fn router(&self) -> &Arc<RingRouter> {
        &self.router
    }

    /// Runs startup, then the liveness loop forever.
    pub async fn run(self) -> Result<()> {
        self.bootstrap().await?;
        tracing::info!("Initialization complete, monitoring the ring...");
        self.monitor.clone().run().await;
        Ok(())
    }

    /// Everything up to and including convergence.
    pub async fn bootstrap(&self) -> Result<()> {
        tracing::info!(
            "Starting node {} at {}",
            self.state.self_id,
            self.state.own_addr
        );

        if self.config.ping_responder {
            let ping_addr = SocketAddr::new(self.state.own_addr.into(), self.config.ping_port);
            tokio::spawn(serve_ping(ping_addr));
        }

        let neighbors = self.discovery.discover().await;
        self.state.set_neighbors(neighbors.clone()).await;

        self.start_router().await?;
        if let Some(http_bind) = self.config.http_bind {
            self.start_http(http_bind).await?;
        }

        self.bridge
            .send(BridgeMessage::neighbors(neighbors.addresses()))
            .await;

        self.announce().await;
        self.wait_for_convergence().await;

        let all_nodes = self.state.snapshot().await;
        tracing::info!("Ring membership: {:?}", all_nodes.keys().collect::<Vec<_>>());
        self.bridge.send(BridgeMessage::AllNodes { all_nodes }).await;

        Ok(())
    }

    async fn start_router(&self) -> Result<()> {
        let bind_addr = SocketAddr::new(self.state.own_addr.into(), self.config.ring_port);
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("Ring endpoint listening on {}", bind_addr);

        let (tx, rx) = mpsc::channel(INBOUND_QUEUE);
        tokio::spawn(accept_loop(listener, tx));

        let router = self.router.clone();
        tokio::spawn(async move {
            router.run(rx).await;
        });

        Ok(())
    }

    async fn start_http(&self, bind_addr: SocketAddr) -> Result<()> {
        let app = handlers::router(self.router.clone());
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("HTTP bridge listening on {}", bind_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP bridge stopped: {}", e);
            }
        });

        Ok(())
    }

    /// Sends this node's id to each neighbor; the packets travel the ring and
    /// collect every member on the way.
    async fn announce(&self) {
        let body = PacketBody::Membership {
            nodes_in_network: vec![self.state.self_id],
        };
        let sent = self.router.broadcast(body).await;
        tracing::info!("Announced node {} to {} neighbor(s)", self.state.self_id, sent);
    }

    /// Polls until this node's id is part of its own membership view. Neighbors that
    /// were still starting up may have missed the first announcement, so it is
    /// repeated on every poll that finds the node unconverged.
    async fn wait_for_convergence(&self) {
        loop {
            if self.state.is_member(self.state.self_id).await {
                return;
            }
            tokio::time::sleep(self.config.convergence_poll).await;
            if self.state.is_member(self.state.self_id).await {
                return;
            }
            tracing::debug!("Own id not in ring membership yet, announcing again");
            self.announce().await;
        }
    }
}
