use bytes::{Buf, Bytes, BytesMut};

use crate::error::{DeviceError, Result};
use crate::traits::Device;

/// In-memory byte device.
///
/// Reads are served from an input buffer and fail with `Closed` once it runs
/// dry, like a file reaching end of stream. Written bytes are captured and,
/// in loopback mode, also appended to the input so a transport can read back
/// what it wrote.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    rx: BytesMut,
    tx: BytesMut,
    loopback: bool,
    closed: bool,
}

impl MemoryDevice {
    /// Device whose input is `input`.
    pub fn new(input: impl AsRef<[u8]>) -> Self {
        Self {
            rx: BytesMut::from(input.as_ref()),
            ..Self::default()
        }
    }

    /// Device with no input; useful as a write sink.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Device that feeds every written byte back into its own input.
    pub fn loopback() -> Self {
        Self {
            loopback: true,
            ..Self::default()
        }
    }

    /// Append bytes to the input.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.rx.extend_from_slice(bytes);
    }

    /// Input bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Take everything written so far, leaving the capture empty.
    pub fn take_written(&mut self) -> Bytes {
        self.tx.split().freeze()
    }
}

impl Device for MemoryDevice {
    fn is_open(&self) -> bool {
        !self.closed
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.closed {
            return Err(DeviceError::NotOpen);
        }
        if self.rx.len() < buf.len() {
            return Err(DeviceError::Closed);
        }
        self.rx.copy_to_slice(buf);
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(DeviceError::NotOpen);
        }
        self.tx.extend_from_slice(buf);
        if self.loopback {
            self.rx.extend_from_slice(buf);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(DeviceError::NotOpen);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn name(&self) -> &str {
        "memory"
    }
}
