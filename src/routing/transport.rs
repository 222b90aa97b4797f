use super::packet::Packet;

use anyhow::Result;
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// Longest packet line accepted from a peer. A connection that sends more without a
/// newline is closed.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Outbound half of the ring channel.
#[async_trait]
pub trait PacketSender: Send + Sync {
    async fn send(&self, addressee: Ipv4Addr, packet: &Packet) -> Result<()>;
}

/// Opens a fresh connection per packet and closes it after writing.
pub struct TcpPacketSender {
    port: u16,
    connect_timeout: Option<Duration>,
}

impl TcpPacketSender {
    pub fn new(port: u16, connect_timeout: Option<Duration>) -> Self {
        Self {
            port,
            connect_timeout,
        }
    }

    async fn connect(&self, addressee: Ipv4Addr) -> Result<TcpStream> {
        let connect = TcpStream::connect((addressee, self.port));
        let stream = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| anyhow::anyhow!("Connect to {} timed out", addressee))??,
            None => connect.await?,
        };
        Ok(stream)
    }
}

#[async_trait]
impl PacketSender for TcpPacketSender {
    async fn send(&self, addressee: Ipv4Addr, packet: &Packet) -> Result<()> {
        let line = packet.to_line()?;
        let mut stream = self.connect(addressee).await?;

        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        Ok(())
    }
}

/// Inbound half of the ring channel: accepts connections and feeds every decoded
/// packet into `tx`. Runs until the receiving side is dropped.
pub async fn accept_loop(listener: TcpListener, tx: mpsc::Sender<Packet>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    read_packets(stream, peer, tx).await;
                });
            }
            Err(e) => {
                tracing::error!("Failed to accept ring connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        if tx.is_closed() {
            tracing::info!("Ring packet consumer gone, closing inbound endpoint");
            return;
        }
    }
}

async fn read_packets(stream: TcpStream, peer: SocketAddr, tx: mpsc::Sender<Packet>) {
    let mut lines = FramedRead::new(stream, LinesCodec::new_with_max_length(MAX_LINE_BYTES));

    while let Some(line) = lines.next().await {
        match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match Packet::from_line(&line) {
                Ok(packet) => {
                    if tx.send(packet).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to deserialize packet from {}: {}", peer, e);
                }
            },
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                tracing::warn!(
                    "Packet from {} exceeds {} bytes, closing connection",
                    peer,
                    MAX_LINE_BYTES
                );
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to read from {}: {}", peer, e);
                return;
            }
        }
    }
}
