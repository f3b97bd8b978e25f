use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DeviceError, Result};
use crate::stream::StreamDevice;
use crate::traits::{Device, DeviceMode, DeviceParams};

/// Path-backed device: regular files and serial-line nodes.
///
/// Serial lines are opened without becoming the controlling terminal and,
/// when a baud rate is given, switched to raw mode so the byte stream is
/// passed through unmodified.
pub struct FileDevice {
    stream: StreamDevice<File>,
    path: PathBuf,
    mode: DeviceMode,
}

impl FileDevice {
    /// Open a device described by `params`.
    pub fn open(params: &DeviceParams) -> Result<Self> {
        let file = open_options(params.mode)
            .open(&params.path)
            .map_err(|source| DeviceError::Open {
                path: params.path.clone(),
                source,
            })?;

        if let Some(baud_rate) = params.baud_rate {
            configure_serial(&file, &params.path, baud_rate)?;
        }

        info!(
            path = ?params.path,
            mode = ?params.mode,
            baud_rate = ?params.baud_rate,
            "device opened"
        );

        Ok(Self {
            stream: StreamDevice::with_name(file, "file"),
            path: params.path.clone(),
            mode: params.mode,
        })
    }

    /// Open a regular file for reading.
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&DeviceParams::new(path, DeviceMode::In))
    }

    /// Create (or truncate) a regular file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&DeviceParams::new(path, DeviceMode::Out))
    }

    /// Duplicate the handle so reads and writes can run on separate threads.
    ///
    /// The clone starts with empty buffers.
    pub fn try_clone(&self) -> Result<Self> {
        let file = self
            .stream
            .get_ref()
            .ok_or(DeviceError::NotOpen)?
            .try_clone()?;
        Ok(Self {
            stream: StreamDevice::with_name(file, "file"),
            path: self.path.clone(),
            mode: self.mode,
        })
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The direction this device was opened for.
    pub fn mode(&self) -> DeviceMode {
        self.mode
    }
}

impl Device for FileDevice {
    fn is_open(&self) -> bool {
        self.stream.is_open()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.mode.can_read() {
            return Err(DeviceError::Unsupported("device opened write-only"));
        }
        self.stream.read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if !self.mode.can_write() {
            return Err(DeviceError::Unsupported("device opened read-only"));
        }
        self.stream.write_all(buf)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.mode.can_write() {
            return Ok(());
        }
        self.stream.flush()
    }

    fn close(&mut self) {
        if self.stream.is_open() {
            if self.mode.can_write() {
                if let Err(err) = self.stream.flush() {
                    debug!(path = ?self.path, %err, "discarding unflushed output on close");
                }
            }
            debug!(path = ?self.path, "device closed");
        }
        self.stream.close();
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl std::fmt::Debug for FileDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDevice")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("open", &self.stream.is_open())
            .finish()
    }
}

fn open_options(mode: DeviceMode) -> OpenOptions {
    let mut options = OpenOptions::new();
    match mode {
        DeviceMode::In => {
            options.read(true);
        }
        DeviceMode::Out => {
            options.write(true).create(true).truncate(true);
        }
        DeviceMode::InOut => {
            options.read(true).write(true).create(true);
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOCTTY).mode(0o644);
    }

    options
}

#[cfg(unix)]
fn configure_serial(file: &File, path: &Path, baud_rate: u32) -> Result<()> {
    crate::serial::configure_raw(file, baud_rate).map_err(|source| DeviceError::Serial {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn configure_serial(_file: &File, _path: &Path, _baud_rate: u32) -> Result<()> {
    Err(DeviceError::Unsupported(
        "serial line configuration requires a Unix platform",
    ))
}
