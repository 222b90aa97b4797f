//! Ring Identity & Membership Module
//!
//! Holds the leaf abstractions that every other subsystem builds on.
//!
//! ## Core Concepts
//! - **Identity**: A node's position on the ring is the third octet of its address
//!   (`<prefix>.<id>.1`), so identities need no coordination and no handshake.
//! - **Membership**: A local, always-sorted registry of every node id this node has seen
//!   in transit packets. Views across nodes converge but are never strongly consistent.
//! - **Distance**: Minimum hop count between two members along the sorted ring, in
//!   either direction.

pub mod identity;
pub mod membership;
pub mod state;
