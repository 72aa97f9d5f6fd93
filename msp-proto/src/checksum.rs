//! MSP v1 checksum.
//!
//! The checksum is a plain XOR fold over the length, command and payload bytes.
//! The preamble is never included.

/// Calculate the XOR checksum of a byte slice.
#[inline]
#[must_use]
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// XOR digest for incremental calculation.
///
/// Use this when a frame is written field by field.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorDigest {
    acc: u8,
}

impl XorDigest {
    /// Create a new, empty digest.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { acc: 0 }
    }

    /// Update the digest with a single byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.acc ^= byte;
    }

    /// Update the digest with a byte slice.
    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.acc ^= xor_checksum(data);
    }

    /// Finalize and return the checksum value.
    #[inline]
    #[must_use]
    pub const fn finalize(self) -> u8 {
        self.acc
    }
}
