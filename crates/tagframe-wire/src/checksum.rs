//! Additive byte-sum checksums.
//!
//! Every checksum in the protocol is the sum of the covered bytes modulo 256.
//! This detects any corruption that changes the byte sum (every single-byte
//! error, most bursts) but not reordered bytes or errors that cancel out.

use crate::codec::Scalar;

/// Sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Sum of the in-memory bytes of a 1, 2, 4 or 8 byte scalar.
pub fn checksum_of<T: Scalar>(value: T) -> u8 {
    checksum(value.to_native_bytes().as_ref())
}

/// Running checksum with nested scopes.
///
/// The base scope covers one object body. [`open_scope`](Self::open_scope)
/// starts a fresh accumulator for a checksum-guarded field; closing it folds
/// the field's sum into the enclosing scope and hands the field's own sum
/// back so it can be written or verified. Scopes nest to any depth.
#[derive(Debug, Clone, Default)]
pub struct RunningChecksum {
    base: u8,
    nested: Vec<u8>,
}

impl RunningChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all scopes and zero the base accumulator.
    pub fn reset(&mut self) {
        self.base = 0;
        self.nested.clear();
    }

    /// Add `bytes` to the innermost scope.
    pub fn fold(&mut self, bytes: &[u8]) {
        let sum = checksum(bytes);
        let top = self.nested.last_mut().unwrap_or(&mut self.base);
        *top = top.wrapping_add(sum);
    }

    /// Value of the innermost scope.
    pub fn current(&self) -> u8 {
        self.nested.last().copied().unwrap_or(self.base)
    }

    /// Start a nested scope at zero.
    pub fn open_scope(&mut self) {
        self.nested.push(0);
    }

    /// End the innermost nested scope and return its sum.
    ///
    /// The sum is also folded into the enclosing scope. Closing with no
    /// nested scope open returns the base value and leaves it in place.
    pub fn close_scope(&mut self) -> u8 {
        match self.nested.pop() {
            Some(inner) => {
                self.fold(&[inner]);
                inner
            }
            None => self.base,
        }
    }

    /// Number of nested scopes currently open.
    pub fn depth(&self) -> usize {
        self.nested.len()
    }
}
