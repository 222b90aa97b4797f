//! Ring Overlay Node Library
//!
//! A coordinator-free ring overlay for machines on a shared subnet. Every node derives its
//! ring position from its own address, finds its nearest neighbors by probing, forwards
//! packets hop by hop around the ring and repairs the ring when neighbors come and go.
//!
//! ## Architecture Modules
//! - **`ring`**: Node identity (address <-> id), the sorted membership registry, ring
//!   distance and the shared topology state.
//! - **`discovery`**: TCP reachability probes and the directional nearest-neighbor search.
//! - **`routing`**: Wire packets, next-hop resolution, the forwarding loop and the
//!   broadcast tracker.
//! - **`monitor`**: The liveness loop: gone/back neighbor detection and topology repair.
//! - **`bridge`**: The boundary to external systems (outbound publishing, inbound HTTP API).
//! - **`node`**: Startup orchestration.
//! - **`config`**: Command-line and environment configuration.

pub mod bridge;
pub mod config;
pub mod discovery;
pub mod monitor;
pub mod node;
pub mod ring;
pub mod routing;

#[cfg(test)]
mod testing;
