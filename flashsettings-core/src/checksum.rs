//! Fletcher-16 checksum
//!
//! Two running sums, each reduced modulo 255 after every byte:
//!
//! ```text
//! sum1 = (sum1 + byte) % 255
//! sum2 = (sum2 + sum1) % 255
//! checksum = (sum2 << 8) | sum1
//! ```
//!
//! The modulus is 255, not 256, and `sum2` accumulates the running `sum1`
//! rather than raw bytes. Storage written by any implementation following
//! these rules validates under any other.
//!
//! See <https://en.wikipedia.org/wiki/Fletcher%27s_checksum>

const MODULUS: u16 = 255;

/// Compute the Fletcher-16 checksum of `data`
pub const fn fletcher16(data: &[u8]) -> u16 {
    let mut sum1: u16 = 0;
    let mut sum2: u16 = 0;

    let mut i = 0;
    while i < data.len() {
        sum1 = (sum1 + data[i] as u16) % MODULUS;
        sum2 = (sum2 + sum1) % MODULUS;
        i += 1;
    }

    (sum2 << 8) | sum1
}

/// Incremental Fletcher-16
///
/// Feeding the input in any number of pieces gives the same result as
/// [`fletcher16`] over the concatenation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fletcher16 {
    sum1: u16,
    sum2: u16,
}

impl Fletcher16 {
    /// Start a new checksum
    pub const fn new() -> Self {
        Self { sum1: 0, sum2: 0 }
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.sum1 = (self.sum1 + byte as u16) % MODULUS;
            self.sum2 = (self.sum2 + self.sum1) % MODULUS;
        }
    }

    /// Checksum of everything fed so far
    pub const fn value(&self) -> u16 {
        (self.sum2 << 8) | self.sum1
    }
}
