//! Framing state machine.
//!
//! Every object travels as one frame:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────┬──────────────────┬──────────────┐
//! │ Sync (1) │ Tag (1) │ Header sum (1)   │ Fields (message) │ Trailer (1)  │
//! │ 0xAB     │         │ 255 - tag - sync │                  │ sum(fields)  │
//! └──────────┴─────────┴──────────────────┴──────────────────┴──────────────┘
//! ```
//!
//! The reader scans byte by byte for a header whose tag is enabled in the
//! registry and whose sum holds. A rejected candidate is never dropped
//! together with the bytes after it: the last byte read becomes the next
//! sync candidate, so every byte gets a chance to anchor a header.

use std::sync::Arc;

use bytes::BytesMut;
use tagframe_device::{Device, DeviceError};
use tracing::{debug, error, info, trace, warn};

use crate::checksum::RunningChecksum;
use crate::codec::{Scalar, Wire};
use crate::config::TransportConfig;
use crate::error::{Result, WireError};
use crate::link::{LinkState, SharedLinkState};
use crate::message::{Message, Tag};
use crate::registry::TypeRegistry;

/// Frame synchronization byte.
pub const SYNC_BYTE: u8 = 0xAB;

/// Sync, tag and header checksum.
pub const HEADER_SIZE: usize = 3;

const FRAME_CAPACITY: usize = 64;

/// Header checksum for `tag`: `255 - tag - SYNC_BYTE` modulo 256.
pub fn header_checksum(tag: Tag) -> u8 {
    255u8.wrapping_sub(tag).wrapping_sub(SYNC_BYTE)
}

/// Whether `sync + tag + checksum` sums to 255 modulo 256.
pub fn header_is_valid(tag: Tag, checksum: u8) -> bool {
    checksum.wrapping_add(SYNC_BYTE).wrapping_add(tag) == 255
}

/// Counters kept by a transport for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Objects decoded with a valid trailer.
    pub frames_read: u64,
    /// Objects written and flushed.
    pub frames_written: u64,
    /// Header candidates rejected for a disabled tag or a bad header sum.
    pub header_rejects: u64,
    /// Frames dropped on a trailing or field checksum mismatch.
    pub checksum_failures: u64,
    /// Frames dropped because a field failed to decode.
    pub decode_failures: u64,
    /// Bytes skipped while scanning for a header.
    pub bytes_discarded: u64,
    /// Device reads or writes that failed.
    pub device_failures: u64,
}

/// Reads and writes framed, checksummed objects over a byte device.
///
/// A transport is driven by one thread at a time. For full duplex use,
/// build a reader/writer pair with [`Transport::duplex`]: each half has its
/// own device and running checksums, and both observe the same link state.
pub struct Transport {
    device: Box<dyn Device>,
    registry: Arc<TypeRegistry>,
    config: TransportConfig,
    link: SharedLinkState,
    read_sum: RunningChecksum,
    write_sum: RunningChecksum,
    /// Frame being assembled by `write_object`; `None` outside of it.
    staged: Option<BytesMut>,
    stats: TransportStats,
}

impl Transport {
    /// Create a stopped transport with default config.
    pub fn new(device: impl Device + 'static, registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(device, registry, TransportConfig::default())
    }

    /// Create a stopped transport with explicit config.
    pub fn with_config(
        device: impl Device + 'static,
        registry: Arc<TypeRegistry>,
        config: TransportConfig,
    ) -> Self {
        Self {
            device: Box::new(device),
            registry,
            config,
            link: SharedLinkState::new(),
            read_sum: RunningChecksum::new(),
            write_sum: RunningChecksum::new(),
            staged: None,
            stats: TransportStats::default(),
        }
    }

    /// Build a reader and a writer that share one link state.
    pub fn duplex(
        reader: impl Device + 'static,
        writer: impl Device + 'static,
        registry: Arc<TypeRegistry>,
        config: TransportConfig,
    ) -> (Transport, Transport) {
        let reader = Self::with_config(reader, Arc::clone(&registry), config);
        let mut writer = Self::with_config(writer, registry, config);
        writer.link = reader.link.clone();
        (reader, writer)
    }

    /// Enter `WaitingSync` if the device is open, `Error` otherwise.
    ///
    /// Calling this on a running link re-checks the device.
    pub fn start(&mut self) -> LinkState {
        let state = if self.device.is_open() {
            LinkState::WaitingSync
        } else {
            LinkState::Error
        };
        self.link.store(state);

        match state {
            LinkState::WaitingSync => info!(device = self.device.name(), "link started"),
            _ => warn!(device = self.device.name(), "link start failed: device not open"),
        }
        state
    }

    /// Enter `Stopped`. No I/O is attempted until the next [`start`](Self::start).
    pub fn stop(&mut self) {
        self.link.store(LinkState::Stopped);
        info!(device = self.device.name(), "link stopped");
    }

    /// Stop the link and release the device.
    pub fn close(&mut self) {
        self.stop();
        self.device.close();
    }

    pub fn state(&self) -> LinkState {
        self.link.load()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Write one framed object and flush it.
    ///
    /// The frame is assembled in memory and reaches the device only once the
    /// message has written all of its fields, so a field the message rejects
    /// leaves the stream untouched. On a device failure the link enters
    /// `Error` and whatever was already written stays on the wire; the peer's
    /// resync scan skips it.
    pub fn write_object<M: Message + ?Sized>(&mut self, message: &M) -> Result<()> {
        self.ensure_running()?;
        let tag = message.tag();

        let mut frame = BytesMut::with_capacity(FRAME_CAPACITY);
        frame.extend_from_slice(&[SYNC_BYTE, tag, header_checksum(tag)]);
        self.staged = Some(frame);
        self.write_sum.reset();
        let written = message.write(self);
        let Some(mut frame) = self.staged.take() else {
            return Err(WireError::Invalid("message wrote a nested frame".into()));
        };
        if let Err(err) = written {
            debug!(tag, %err, "frame discarded before send");
            return Err(err);
        }

        let trailer = self.write_sum.current();
        frame.extend_from_slice(&[trailer]);
        self.send(&frame)?;
        self.flush()?;

        self.stats.frames_written += 1;
        trace!(tag, trailer, "frame written");
        Ok(())
    }

    /// Read the next valid object.
    ///
    /// `None` means the device failed (link now `Error` or stopped) or the
    /// frame was corrupt (link back in `WaitingSync`, ready for the next
    /// call). Use [`try_read_object`](Self::try_read_object) to see why.
    pub fn read_object(&mut self) -> Option<Box<dyn Message>> {
        self.try_read_object().ok()
    }

    /// Read the next valid object, reporting why none was produced.
    pub fn try_read_object(&mut self) -> Result<Box<dyn Message>> {
        self.ensure_running()?;
        let tag = self.scan_header()?;

        self.link.transition(LinkState::WaitingSync, LinkState::Functional);
        let result = self.read_body(tag);
        self.link.transition(LinkState::Functional, LinkState::WaitingSync);

        match &result {
            Ok(_) => {
                self.stats.frames_read += 1;
                trace!(tag, "frame read");
            }
            Err(err @ WireError::ChecksumMismatch { .. }) => {
                self.stats.checksum_failures += 1;
                debug!(tag, %err, "frame dropped");
            }
            Err(err) if err.is_corruption() => {
                self.stats.decode_failures += 1;
                debug!(tag, %err, "frame dropped");
            }
            Err(_) => {}
        }
        result
    }

    /// Write a value, folding its bytes into the running checksum.
    pub fn write<T: Wire>(&mut self, value: &T) -> Result<()> {
        value.write_to(self)
    }

    /// Read a value, folding its bytes into the running checksum.
    pub fn read<T: Wire>(&mut self) -> Result<T> {
        T::read_from(self)
    }

    /// Write a value followed by a checksum over just that value.
    ///
    /// The value bytes and the checksum byte both count toward the
    /// enclosing scope.
    pub fn write_checksumed<T: Wire>(&mut self, value: &T) -> Result<()> {
        self.write_sum.open_scope();
        let written = value.write_to(self);
        let sum = self.write_sum.close_scope();
        written?;
        self.write_scalar(sum)
    }

    /// Read a value written by [`write_checksumed`](Self::write_checksumed)
    /// and verify its checksum before handing it back.
    pub fn read_checksumed<T: Wire>(&mut self) -> Result<T> {
        self.read_sum.open_scope();
        let value = T::read_from(self);
        let computed = self.read_sum.close_scope();
        let value = value?;

        let expected: u8 = self.read_scalar()?;
        if expected != computed {
            return Err(WireError::ChecksumMismatch { expected, computed });
        }
        Ok(value)
    }

    /// Write a scalar after byte-order correction.
    pub fn write_scalar<T: Scalar>(&mut self, value: T) -> Result<()> {
        let bytes = self.config.endianness.correct(value).to_native_bytes();
        self.write_bytes(bytes.as_ref())
    }

    /// Read a scalar and undo byte-order correction.
    pub fn read_scalar<T: Scalar>(&mut self) -> Result<T> {
        let mut bytes = T::Bytes::default();
        self.read_bytes(bytes.as_mut())?;
        Ok(self.config.endianness.correct(T::from_native_bytes(bytes)))
    }

    /// Write raw bytes, folding them into the running checksum.
    ///
    /// Inside [`write_object`](Self::write_object) the bytes join the frame
    /// being assembled; otherwise they go straight to the device.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match self.staged.as_mut() {
            Some(frame) => frame.extend_from_slice(bytes),
            None => self.send(bytes)?,
        }
        self.write_sum.fold(bytes);
        Ok(())
    }

    /// Fill `buf` with raw bytes, folding them into the running checksum.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.recv(buf)?;
        self.read_sum.fold(buf);
        Ok(())
    }

    /// Push buffered output to the device.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.device.flush().map_err(|err| self.device_failed(err))
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_mut()
    }

    /// Consume the transport and hand back its device.
    pub fn into_device(self) -> Box<dyn Device> {
        self.device
    }

    fn scan_header(&mut self) -> Result<Tag> {
        let mut candidate = self.recv_byte()?;
        loop {
            if candidate != SYNC_BYTE {
                self.stats.bytes_discarded += 1;
                candidate = self.recv_byte()?;
                continue;
            }

            let tag = self.recv_byte()?;
            if !self.registry.is_enabled(tag) {
                self.reject_header(1);
                candidate = tag;
                continue;
            }

            let checksum = self.recv_byte()?;
            if !header_is_valid(tag, checksum) {
                self.reject_header(2);
                candidate = checksum;
                continue;
            }

            return Ok(tag);
        }
    }

    fn read_body(&mut self, tag: Tag) -> Result<Box<dyn Message>> {
        self.read_sum.reset();
        let mut message = self
            .registry
            .instantiate(tag)
            .ok_or(WireError::UnknownTag(tag))?;
        message.read(self)?;

        let computed = self.read_sum.current();
        let expected = self.recv_byte()?;
        if expected != computed {
            return Err(WireError::ChecksumMismatch { expected, computed });
        }
        Ok(message)
    }

    fn reject_header(&mut self, dropped: u64) {
        self.stats.header_rejects += 1;
        self.stats.bytes_discarded += dropped;
    }

    fn ensure_running(&self) -> Result<()> {
        let state = self.link.load();
        if state.is_running() {
            Ok(())
        } else {
            Err(WireError::NotRunning(state))
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_running()?;
        self.device
            .write_all(bytes)
            .map_err(|err| self.device_failed(err))
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_running()?;
        self.device
            .read_exact(buf)
            .map_err(|err| self.device_failed(err))
    }

    fn recv_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.recv(&mut byte)?;
        Ok(byte[0])
    }

    fn device_failed(&mut self, err: DeviceError) -> WireError {
        self.link.fail();
        self.stats.device_failures += 1;
        match err {
            DeviceError::Closed => {
                warn!(device = self.device.name(), "device reached end of stream")
            }
            ref other => error!(device = self.device.name(), err = %other, "device failure"),
        }
        WireError::Device(err)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("device", &self.device.name())
            .field("state", &self.link.load())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
