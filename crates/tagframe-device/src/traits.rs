use std::path::{Path, PathBuf};

use crate::error::Result;

/// A blocking byte device: the only thing the framing layer needs from a link.
///
/// Reads block until the whole buffer is filled or the device fails; a
/// failure is reported through the returned error and never by panicking.
/// Writes may be buffered by the device until [`Device::flush`] is called.
pub trait Device: Send {
    /// Whether the device is open and ready for I/O.
    fn is_open(&self) -> bool;

    /// Fill `buf` completely (blocking).
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Queue all of `buf` for transmission.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Push queued bytes out to the underlying medium.
    fn flush(&mut self) -> Result<()>;

    /// Release the underlying handle. Further I/O fails with `NotOpen`.
    fn close(&mut self);

    /// Device name for diagnostics.
    fn name(&self) -> &str {
        "device"
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Direction a device is opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    /// Read only.
    In,
    /// Write only; regular files are created and truncated.
    Out,
    /// Read and write.
    #[default]
    InOut,
}

impl DeviceMode {
    pub fn can_read(self) -> bool {
        matches!(self, DeviceMode::In | DeviceMode::InOut)
    }

    pub fn can_write(self) -> bool {
        matches!(self, DeviceMode::Out | DeviceMode::InOut)
    }
}

/// Parameters used to open a path-backed device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceParams {
    /// Filesystem path of the device (regular file or tty node).
    pub path: PathBuf,
    /// Direction to open the device for.
    pub mode: DeviceMode,
    /// When set, the path is treated as a serial line and switched to raw
    /// mode at this baud rate.
    pub baud_rate: Option<u32>,
}

impl DeviceParams {
    pub fn new(path: impl AsRef<Path>, mode: DeviceMode) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode,
            baud_rate: None,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }
}
