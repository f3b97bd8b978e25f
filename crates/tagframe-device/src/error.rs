use std::path::PathBuf;

/// Errors that can occur in byte device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Failed to open the device at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to configure the serial line behind the device.
    #[error("failed to configure serial line {path}: {source}")]
    Serial {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the device.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device reached end of stream or the peer hung up.
    #[error("device closed (end of stream)")]
    Closed,

    /// The device has not been opened or was closed by its owner.
    #[error("device is not open")]
    NotOpen,

    /// The operation is not supported by the device in its current mode.
    #[error("unsupported device operation: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
