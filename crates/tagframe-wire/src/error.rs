use tagframe_device::DeviceError;

use crate::link::LinkState;
use crate::message::Tag;

/// Errors that can occur while framing, encoding or decoding objects.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The underlying device failed; the link is now in `Error`.
    #[error("device failure: {0}")]
    Device(#[from] DeviceError),

    /// I/O was attempted while the link was stopped or failed.
    #[error("link is not running (state: {0})")]
    NotRunning(LinkState),

    /// A trailing or field checksum did not match the received bytes.
    #[error("checksum mismatch (received {expected:#04x}, computed {computed:#04x})")]
    ChecksumMismatch { expected: u8, computed: u8 },

    /// A length prefix exceeds the configured maximum.
    #[error("field length {len} exceeds maximum {max}")]
    FieldTooLong { len: usize, max: usize },

    /// A string field does not hold valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// No factory is available for a tag.
    #[error("no enabled type registered for tag {0:#04x}")]
    UnknownTag(Tag),

    /// A tag is already registered.
    #[error("tag {tag:#04x} already registered as '{existing}'")]
    DuplicateTag { tag: Tag, existing: String },

    /// A factory produced a message reporting a different tag.
    #[error("factory for tag {registered:#04x} produced a message tagged {reported:#04x}")]
    TagMismatch { registered: Tag, reported: Tag },

    /// A message rejected a decoded field value.
    #[error("invalid field: {0}")]
    Invalid(String),
}

impl WireError {
    /// Device failures take the link to `Error` and need the owner's attention.
    pub fn is_device_failure(&self) -> bool {
        matches!(self, WireError::Device(_))
    }

    /// Frame corruption is absorbed by the resync scan.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            WireError::ChecksumMismatch { .. }
                | WireError::FieldTooLong { .. }
                | WireError::InvalidUtf8(_)
                | WireError::UnknownTag(_)
                | WireError::Invalid(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(WireError::Device(DeviceError::Closed).is_device_failure());
        assert!(!WireError::Device(DeviceError::Closed).is_corruption());
        assert!(WireError::ChecksumMismatch {
            expected: 1,
            computed: 2
        }
        .is_corruption());
        assert!(WireError::UnknownTag(9).is_corruption());
        assert!(!WireError::NotRunning(LinkState::Stopped).is_corruption());
        assert!(!WireError::NotRunning(LinkState::Stopped).is_device_failure());
    }

    #[test]
    fn messages_render_hex_tags() {
        let err = WireError::DuplicateTag {
            tag: 7,
            existing: "Ping".to_string(),
        };
        assert_eq!(err.to_string(), "tag 0x07 already registered as 'Ping'");
    }
}
