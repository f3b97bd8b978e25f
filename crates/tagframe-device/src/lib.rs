//! Byte device abstraction for tagframe.
//!
//! A device moves raw octets and nothing else:
//! - [`FileDevice`] for regular files and serial lines (`/dev/ttyUSB0`)
//! - [`StreamDevice`] over any `Read + Write` stream (sockets, pipes)
//! - [`MemoryDevice`] for in-memory buffers and loopback testing
//!
//! This is the lowest layer of tagframe. The framing state machine in
//! `tagframe-wire` only ever talks to the [`Device`] trait defined here.

pub mod error;
pub mod file;
pub mod memory;
#[cfg(unix)]
pub mod serial;
pub mod stream;
pub mod traits;

pub use error::{DeviceError, Result};
pub use file::FileDevice;
pub use memory::MemoryDevice;
pub use stream::StreamDevice;
pub use traits::{Device, DeviceMode, DeviceParams};
