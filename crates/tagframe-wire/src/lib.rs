//! Checksummed, type-tagged object framing for unreliable byte links.
//!
//! Each object is written as a frame carrying:
//! - A sync byte (`0xAB`) for loss-of-sync recovery
//! - A one-byte type tag, looked up in a [`TypeRegistry`]
//! - A header checksum, then the object's fields and a trailing byte-sum
//!
//! The reader pulls one object per call, skipping corrupt or unknown frames
//! and resynchronizing on the next valid header.

pub mod basic;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod endian;
pub mod error;
pub mod link;
pub mod message;
pub mod registry;
pub mod transport;

pub use basic::BasicType;
pub use checksum::{checksum, checksum_of, RunningChecksum};
pub use codec::{read_bytes_bounded, read_string_bounded, Scalar, Wire};
pub use config::{RegistryConfig, TransportConfig, DEFAULT_MAX_FIELD_LEN};
pub use endian::{Correct, Endianness};
pub use error::{Result, WireError};
pub use link::LinkState;
pub use message::{AsAny, Message, MessageType, Tag};
pub use registry::{Factory, RegistryEntry, TypeRegistry};
pub use transport::{
    header_checksum, header_is_valid, Transport, TransportStats, HEADER_SIZE, SYNC_BYTE,
};
