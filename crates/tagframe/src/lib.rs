//! Type-tagged, checksummed object framing for unreliable byte links.
//!
//! tagframe moves self-describing objects over serial lines, files and
//! sockets. A reader recovers from line noise by rescanning for the next
//! valid frame header.
//!
//! # Crate Structure
//!
//! - [`device`]: Byte devices (files, serial lines, streams, memory)
//! - [`wire`]: Framing state machine, checksums, type registry
//! - [`messages`]: Demo message set used by the `tagframe` CLI

/// Re-export device types.
pub mod device {
    pub use tagframe_device::*;
}

/// Re-export wire types.
pub mod wire {
    pub use tagframe_wire::*;
}

pub mod messages;
