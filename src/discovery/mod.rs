//! Neighbor Discovery Module
//!
//! Finds this node's immediate ring neighbors by probing candidate addresses.
//!
//! ## Core Mechanisms
//! - **Probing**: A short TCP connect against a candidate's ping port. Success is the only
//!   signal; unreachable candidates are a normal outcome, never an error.
//! - **Directional Search**: Candidates are walked outward from this node's id, to the right
//!   (ascending, wrapping to 1) and to the left (descending, wrapping to 255). The first
//!   responder in each direction becomes the neighbor on that side.
//! - **Retry**: A round that finds nobody is logged and repeated until someone answers.

pub mod probe;
pub mod search;
pub mod types;
