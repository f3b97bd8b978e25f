use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BytesMut};

use crate::error::{DeviceError, Result};
use crate::traits::Device;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;
/// Pending output is pushed to the stream once it grows past this.
const WRITE_HIGH_WATER: usize = 64 * 1024;

/// Byte device over any blocking `Read + Write` stream.
///
/// Reads are buffered: the stream is drained in chunks and callers are served
/// from the buffer, so a byte-at-a-time consumer costs one syscall per chunk
/// rather than one per byte. Writes accumulate until [`Device::flush`].
pub struct StreamDevice<S> {
    inner: Option<S>,
    rx: BytesMut,
    tx: BytesMut,
    name: &'static str,
}

impl<S: Read + Write + Send> StreamDevice<S> {
    /// Wrap an already connected stream.
    pub fn new(inner: S) -> Self {
        Self::with_name(inner, "stream")
    }

    /// Wrap a stream and label it for diagnostics.
    pub fn with_name(inner: S, name: &'static str) -> Self {
        Self {
            inner: Some(inner),
            rx: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            tx: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            name,
        }
    }

    /// Number of received bytes buffered but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.rx.len()
    }

    /// Number of bytes queued for writing.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> Option<&S> {
        self.inner.as_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.inner.as_mut()
    }

    /// Consume the device and return the inner stream, dropping buffered data.
    pub fn into_inner(self) -> Option<S> {
        self.inner
    }

    fn fill(&mut self, needed: usize) -> Result<()> {
        while self.rx.len() < needed {
            let inner = self.inner.as_mut().ok_or(DeviceError::NotOpen)?;

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DeviceError::Io(err)),
            };

            if read == 0 {
                return Err(DeviceError::Closed);
            }

            self.rx.extend_from_slice(&chunk[..read]);
        }
        Ok(())
    }

    fn drain_tx(&mut self) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(DeviceError::NotOpen)?;

        while !self.tx.is_empty() {
            match inner.write(&self.tx) {
                Ok(0) => return Err(DeviceError::Closed),
                Ok(n) => self.tx.advance(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DeviceError::Io(err)),
            }
        }

        loop {
            match inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DeviceError::Io(err)),
            }
        }
    }
}

impl<S: Read + Write + Send> Device for StreamDevice<S> {
    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.fill(buf.len())?;
        self.rx.copy_to_slice(buf);
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.inner.is_none() {
            return Err(DeviceError::NotOpen);
        }
        self.tx.extend_from_slice(buf);
        if self.tx.len() >= WRITE_HIGH_WATER {
            self.drain_tx()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.drain_tx()
    }

    fn close(&mut self) {
        self.inner = None;
        self.rx.clear();
        self.tx.clear();
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl<S> std::fmt::Debug for StreamDevice<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDevice")
            .field("name", &self.name)
            .field("open", &self.inner.is_some())
            .field("buffered", &self.rx.len())
            .field("pending", &self.tx.len())
            .finish()
    }
}
