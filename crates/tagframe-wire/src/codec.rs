//! Field-level wire encoding.
//!
//! Scalars travel as their in-memory bytes after byte-order correction:
//!
//! ```text
//! u8/i8          1 byte
//! u16/i16        2 bytes, corrected
//! u32/i32/f32    4 bytes, corrected
//! u64/i64/f64    8 bytes, corrected
//! ```
//!
//! Strings and byte vectors are length-prefixed; the prefix carries its own
//! checksum so a corrupted length is caught before the payload is trusted:
//!
//! ```text
//! ┌──────────────┬───────────────┬────────────────┐
//! │ Length (4B)  │ Checksum (1B) │ Payload        │
//! │ u32 corrected│ sum of length │ (Length bytes) │
//! └──────────────┴───────────────┴────────────────┘
//! ```

use crate::endian::Correct;
use crate::error::{Result, WireError};
use crate::transport::Transport;

/// Fixed-width scalar with a byte-level representation.
pub trait Scalar: Correct {
    /// In-memory byte array for this scalar.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_native_bytes(self) -> Self::Bytes;
    fn from_native_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn to_native_bytes(self) -> Self::Bytes {
                    self.to_ne_bytes()
                }

                fn from_native_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_ne_bytes(bytes)
                }
            }

            impl Wire for $ty {
                fn write_to(&self, transport: &mut Transport) -> Result<()> {
                    transport.write_scalar(*self)
                }

                fn read_from(transport: &mut Transport) -> Result<Self> {
                    transport.read_scalar()
                }
            }
        )*
    };
}

/// A value that can be written to and read back from a transport.
///
/// Implemented for every fixed-width scalar, `String` and `Vec<u8>`.
/// Composite fields implement it by delegating to their members in a fixed
/// order.
pub trait Wire: Sized {
    fn write_to(&self, transport: &mut Transport) -> Result<()>;
    fn read_from(transport: &mut Transport) -> Result<Self>;
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Wire for Vec<u8> {
    fn write_to(&self, transport: &mut Transport) -> Result<()> {
        write_length(transport, self.len())?;
        transport.write_bytes(self)
    }

    fn read_from(transport: &mut Transport) -> Result<Self> {
        let max = transport.config().max_field_len;
        read_bytes_bounded(transport, max)
    }
}

impl Wire for String {
    fn write_to(&self, transport: &mut Transport) -> Result<()> {
        write_length(transport, self.len())?;
        transport.write_bytes(self.as_bytes())
    }

    fn read_from(transport: &mut Transport) -> Result<Self> {
        let max = transport.config().max_field_len;
        read_string_bounded(transport, max)
    }
}

/// Read a length-prefixed byte field no longer than `max`.
///
/// The effective limit is the smaller of `max` and the transport's
/// `max_field_len`; the length is checked before the payload is allocated.
pub fn read_bytes_bounded(transport: &mut Transport, max: usize) -> Result<Vec<u8>> {
    let len = read_length(transport, max)?;
    let mut buf = vec![0u8; len];
    transport.read_bytes(&mut buf)?;
    Ok(buf)
}

/// Read a length-prefixed UTF-8 string no longer than `max` bytes.
pub fn read_string_bounded(transport: &mut Transport, max: usize) -> Result<String> {
    let bytes = read_bytes_bounded(transport, max)?;
    Ok(String::from_utf8(bytes)?)
}

fn write_length(transport: &mut Transport, len: usize) -> Result<()> {
    let max = transport.config().max_field_len.min(u32::MAX as usize);
    if len > max {
        return Err(WireError::FieldTooLong { len, max });
    }
    transport.write_checksumed(&(len as u32))
}

fn read_length(transport: &mut Transport, max: usize) -> Result<usize> {
    let len = transport.read_checksumed::<u32>()? as usize;
    let max = max.min(transport.config().max_field_len);
    if len > max {
        return Err(WireError::FieldTooLong { len, max });
    }
    Ok(len)
}
