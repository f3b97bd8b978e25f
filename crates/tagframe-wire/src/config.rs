use crate::endian::Endianness;

/// Default cap on decoded string and byte-field lengths: 16 MiB.
pub const DEFAULT_MAX_FIELD_LEN: usize = 16 * 1024 * 1024;

/// Configuration for a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Byte-order correction for multi-byte scalars.
    pub endianness: Endianness,
    /// Longest length-prefixed field accepted on read. Longer prefixes are
    /// treated as corruption before anything is allocated.
    pub max_field_len: usize,
}

impl TransportConfig {
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            endianness,
            ..Self::default()
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Native,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

/// Controls type registry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, a newly registered tag is accepted from the wire at once.
    pub enable_on_register: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enable_on_register: true,
        }
    }
}
