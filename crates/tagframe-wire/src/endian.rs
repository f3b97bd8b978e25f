//! Byte-order correction for multi-byte scalars.
//!
//! Correction is chosen once per transport. With [`Endianness::Native`] the
//! in-memory representation goes on the wire untouched; with
//! [`Endianness::Swap`] every 2, 4 and 8 byte scalar is byte-reversed on its
//! way out and on its way in. Single bytes are never touched.

/// Byte-order correction applied to every multi-byte scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Wire order equals host order; correction is a no-op.
    #[default]
    Native,
    /// Wire order is the reverse of host order.
    Swap,
}

impl Endianness {
    /// Correction that puts little-endian bytes on the wire on this host.
    pub fn wire_little() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Native
        } else {
            Endianness::Swap
        }
    }

    /// Correction that puts big-endian bytes on the wire on this host.
    pub fn wire_big() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Native
        } else {
            Endianness::Swap
        }
    }

    pub fn is_swap(self) -> bool {
        self == Endianness::Swap
    }

    /// Apply the correction to a scalar.
    pub fn correct<T: Correct>(self, value: T) -> T {
        match self {
            Endianness::Native => value,
            Endianness::Swap => value.swapped(),
        }
    }
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endianness::Native => f.write_str("native"),
            Endianness::Swap => f.write_str("swap"),
        }
    }
}

/// Scalars whose byte order can be reversed.
///
/// Floats are reversed through their bit pattern, so a swapped NaN keeps its
/// payload bits.
pub trait Correct: Copy {
    fn swapped(self) -> Self;
}

pub fn swap16(v: u16) -> u16 {
    v.rotate_left(8)
}

pub fn swap32(v: u32) -> u32 {
    v.swap_bytes()
}

pub fn swap64(v: u64) -> u64 {
    v.swap_bytes()
}

macro_rules! impl_correct {
    ($($ty:ty => $swap:ident as $bits:ty),* $(,)?) => {
        $(
            impl Correct for $ty {
                fn swapped(self) -> Self {
                    $swap(self as $bits) as $ty
                }
            }
        )*
    };
}

impl_correct!(
    u16 => swap16 as u16,
    i16 => swap16 as u16,
    u32 => swap32 as u32,
    i32 => swap32 as u32,
    u64 => swap64 as u64,
    i64 => swap64 as u64,
);

impl Correct for u8 {
    fn swapped(self) -> Self {
        self
    }
}

impl Correct for i8 {
    fn swapped(self) -> Self {
        self
    }
}

impl Correct for f32 {
    fn swapped(self) -> Self {
        f32::from_bits(swap32(self.to_bits()))
    }
}

impl Correct for f64 {
    fn swapped(self) -> Self {
        f64::from_bits(swap64(self.to_bits()))
    }
}
