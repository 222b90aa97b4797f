//! Liveness Monitoring Module
//!
//! The steady-state control loop that keeps the neighbor set correct.
//!
//! ## Core Mechanisms
//! - **Gone Detection**: Current neighbors are re-probed every tick; a neighbor that does not
//!   answer is gone and leaves the membership.
//! - **Back Detection**: A fresh discovery round yields candidate neighbors. When they differ
//!   from the current ones, ring distance decides which candidates are closer and should be
//!   adopted (`adoption`).
//! - **Repair**: The candidate set replaces the neighbor set in one step, and every change is
//!   announced to the neighbors and to the bridge.

pub mod adoption;
pub mod liveness;

#[cfg(test)]
mod tests;
