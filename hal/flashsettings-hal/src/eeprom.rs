//! EEPROM storage abstraction
//!
//! Models the classic Arduino-style EEPROM: a working region is reserved
//! with [`Eeprom::init`], single bytes are read and written at random
//! offsets, and buffered writes only become durable after
//! [`Eeprom::commit`].
//!
//! Offsets are relative to the start of the reserved region.

/// Errors from EEPROM storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Read or write before `init` reserved a working region
    NotInitialized,
    /// Offset lies outside the reserved working region
    OutOfBounds,
    /// Requested capacity exceeds what the device can provide
    CapacityTooLarge,
    /// Region does not line up with the device's erase or write granularity
    Misaligned,
    /// Underlying flash/EEPROM operation failed
    Flash,
}

/// Byte-addressable non-volatile storage
///
/// Implementations may buffer writes (write-back) as long as everything
/// written before a successful [`commit`](Eeprom::commit) survives a power
/// loss. Reads always observe the most recent `write_byte`, committed or
/// not.
pub trait Eeprom {
    /// Reserve a working region of at least `capacity` bytes
    ///
    /// Must be called before any read or write. Calling it again with a
    /// capacity that still fits is allowed.
    fn init(&mut self, capacity: usize) -> Result<(), EepromError>;

    /// Read a single byte
    fn read_byte(&mut self, offset: usize) -> Result<u8, EepromError>;

    /// Write a single byte into the write-back buffer
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), EepromError>;

    /// Flush buffered writes durably to the non-volatile medium
    fn commit(&mut self) -> Result<(), EepromError>;

    /// Number of bytes in the reserved working region (0 before `init`)
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` consecutive bytes starting at `offset`
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_byte(offset + i)?;
        }
        Ok(())
    }

    /// Write `data` byte by byte starting at `offset`
    ///
    /// Does not commit.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        for (i, &byte) in data.iter().enumerate() {
            self.write_byte(offset + i, byte)?;
        }
        Ok(())
    }
}

impl<E: Eeprom + ?Sized> Eeprom for &mut E {
    fn init(&mut self, capacity: usize) -> Result<(), EepromError> {
        (**self).init(capacity)
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, EepromError> {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), EepromError> {
        (**self).write_byte(offset, value)
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        (**self).commit()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}

/// Check that `offset` lies inside a region of `capacity` bytes
///
/// Shared bounds check for implementations. A zero capacity means the
/// region was never reserved.
pub fn check_offset(offset: usize, capacity: usize) -> Result<(), EepromError> {
    if capacity == 0 {
        return Err(EepromError::NotInitialized);
    }
    if offset >= capacity {
        return Err(EepromError::OutOfBounds);
    }
    Ok(())
}
