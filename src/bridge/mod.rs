//! External Bridge Module
//!
//! The boundary between the ring and the outside world.
//!
//! - **Outbound** (`client`): neighbor lists, membership snapshots, topology events and relayed
//!   commands are pushed through an `EventBridge`. `HttpBridge` POSTs them to a configured
//!   endpoint; `LogBridge` only logs them.
//! - **Inbound** (`handlers`): a small HTTP API that injects commands into the ring and
//!   reports this node's view of it.

pub mod client;
pub mod handlers;
pub mod types;
