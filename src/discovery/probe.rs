use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Reachability test for a single candidate address.
///
/// Implementations must never fail: any error simply means "not reachable".
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr) -> bool;
}

/// Probes candidates with a bounded TCP connect to their ping port.
pub struct TcpProber {
    own_addr: Ipv4Addr,
    port: u16,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(own_addr: Ipv4Addr, port: u16, timeout: Duration) -> Self {
        Self {
            own_addr,
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        if addr == self.own_addr {
            return false;
        }

        match tokio::time::timeout(self.timeout, TcpStream::connect((addr, self.port))).await {
            Ok(Ok(_stream)) => {
                tracing::trace!("Probe {}:{} answered", addr, self.port);
                true
            }
            Ok(Err(e)) => {
                tracing::trace!("Probe {}:{} failed: {}", addr, self.port, e);
                false
            }
            Err(_) => {
                tracing::trace!("Probe {}:{} timed out", addr, self.port);
                false
            }
        }
    }
}

/// Accepts and immediately drops connections on the ping port so that other
/// nodes' probes succeed against this one.
pub async fn serve_ping(bind_addr: SocketAddr) {
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::warn!(
                "Ping responder could not bind {} ({}), relying on another service there",
                bind_addr,
                e
            );
            return;
        }
    };

    tracing::info!("Ping responder listening on {}", bind_addr);

    loop {
        match listener.accept().await {
            Ok((_stream, peer)) => {
                tracing::trace!("Ping from {}", peer);
            }
            Err(e) => {
                tracing::warn!("Ping responder accept failed: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
