//! Node Coordination Module
//!
//! Wires the subsystems together and owns the startup sequence:
//!
//! 1. **Discover**: find at least one neighbor (blocks until one answers).
//! 2. **Connect**: bind the inbound ring endpoint and start the router loop.
//! 3. **Announce**: send this node's id to each neighbor as a membership packet.
//! 4. **Converge**: wait until this node's own id comes back in the merged membership.
//! 5. **Monitor**: hand over to the liveness loop for the rest of the process lifetime.

pub mod coordinator;
