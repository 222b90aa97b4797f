//! Ring Routing Module
//!
//! Moves packets hop by hop around the ring and piggy-backs membership updates on them.
//!
//! ## Core Mechanisms
//! - **Origination**: A packet is stamped with the originating node id and a trace id, then
//!   handed to one neighbor.
//! - **Forwarding**: Every other node merges the packet's membership list, picks the next hop
//!   from the sorted membership (`next_hop`) and passes the packet on. Commands are also
//!   handed to the external bridge at every hop they pass.
//! - **Termination**: A packet that arrives back at its originator stops there. The broadcast
//!   `tracker` records that transition.
//! - **Transport**: One newline-delimited JSON packet per short-lived TCP connection.

pub mod next_hop;
pub mod packet;
pub mod router;
pub mod tracker;
pub mod transport;
