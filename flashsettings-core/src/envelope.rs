//! Record envelope
//!
//! Every persisted record starts with a fixed 4-byte header:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────────────┐
//! │ SIZE     │ CHECKSUM │ PAYLOAD                  │
//! │ 2B (LE)  │ 2B (LE)  │ size_of::<T>() bytes     │
//! └──────────┴──────────┴──────────────────────────┘
//! ```
//!
//! - SIZE: byte size of the whole record (header + payload) as compiled.
//!   A different value in storage means the layout changed.
//! - CHECKSUM: Fletcher-16 over the whole record with the CHECKSUM bytes
//!   taken as zero.
//!
//! The header is encoded explicitly (little-endian) instead of being cast
//! from a struct, so the stored layout never depends on target padding.

use crate::checksum::Fletcher16;

/// Checksum value of a freshly constructed record
///
/// Both Fletcher-16 sums are reduced modulo 255, so no computed checksum
/// has a 0xFF byte. The first save after construction therefore always
/// writes, even when the defaults were never persisted.
pub const SENTINEL_CHECKSUM: u16 = 0xFFFF;

/// Size and checksum header shared by every settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Envelope {
    /// Byte size of the full record
    pub size: u16,
    /// Fletcher-16 of the full record with this field zeroed
    pub checksum: u16,
}

impl Envelope {
    /// Encoded size of the envelope
    pub const SIZE: usize = 4;

    /// Byte range of the size field within the image
    pub const SIZE_FIELD: core::ops::Range<usize> = 0..2;

    /// Byte range of the checksum field within the image
    pub const CHECKSUM_FIELD: core::ops::Range<usize> = 2..4;

    /// Envelope for a record of `record_size` bytes with the sentinel checksum
    pub const fn new(record_size: u16) -> Self {
        Self {
            size: record_size,
            checksum: SENTINEL_CHECKSUM,
        }
    }

    /// Encode as stored
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let size = self.size.to_le_bytes();
        let checksum = self.checksum.to_le_bytes();
        [size[0], size[1], checksum[0], checksum[1]]
    }

    /// Decode from stored bytes
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            size: u16::from_le_bytes([bytes[0], bytes[1]]),
            checksum: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    /// Fletcher-16 over this envelope followed by `payload`, with the
    /// checksum field taken as zero
    ///
    /// The stored checksum field never contributes, so this is the value
    /// that belongs in `checksum` for the given payload.
    pub fn checksum_with(&self, payload: &[u8]) -> u16 {
        let header = Self {
            size: self.size,
            checksum: 0,
        };

        let mut sum = Fletcher16::new();
        sum.update(&header.to_bytes());
        sum.update(payload);
        sum.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::fletcher16;

    #[test]
    fn test_new_uses_sentinel() {
        let envelope = Envelope::new(12);
        assert_eq!(envelope.size, 12);
        assert_eq!(envelope.checksum, SENTINEL_CHECKSUM);
    }

    #[test]
    fn test_byte_layout() {
        let envelope = Envelope {
            size: 0x0102,
            checksum: 0xA0B0,
        };
        let bytes = envelope.to_bytes();
        assert_eq!(bytes, [0x02, 0x01, 0xB0, 0xA0]);
        assert_eq!(bytes[Envelope::SIZE_FIELD], [0x02, 0x01]);
        assert_eq!(bytes[Envelope::CHECKSUM_FIELD], [0xB0, 0xA0]);
        assert_eq!(Envelope::from_bytes(bytes), envelope);
    }

    #[test]
    fn test_checksum_ignores_stored_checksum() {
        let payload = [7u8, 0, 42, 13];
        let a = Envelope {
            size: 8,
            checksum: 0x1234,
        };
        let b = Envelope {
            size: 8,
            checksum: SENTINEL_CHECKSUM,
        };
        assert_eq!(a.checksum_with(&payload), b.checksum_with(&payload));
    }

    #[test]
    fn test_checksum_matches_flat_image() {
        let payload = [1u8, 2, 3, 4];
        let envelope = Envelope::new(8);
        let image = [8u8, 0, 0, 0, 1, 2, 3, 4];
        assert_eq!(envelope.checksum_with(&payload), fletcher16(&image));
    }

    #[test]
    fn test_checksum_covers_size_field() {
        let payload = [1u8, 2, 3, 4];
        assert_ne!(
            Envelope::new(8).checksum_with(&payload),
            Envelope::new(9).checksum_with(&payload)
        );
    }
}
