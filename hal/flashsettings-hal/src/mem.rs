//! RAM-backed EEPROM
//!
//! Simulates a write-back EEPROM entirely in memory. Writes land in a
//! working buffer and only reach the "durable" image on
//! [`commit`](Eeprom::commit); [`MemEeprom::power_cycle`] throws away
//! anything that was not committed. Useful for host-side tests and for
//! boards without a real EEPROM during bring-up.

use crate::eeprom::{check_offset, Eeprom, EepromError};

/// Value of never-written cells (erased NOR flash reads as all ones)
pub const ERASED_BYTE: u8 = 0xFF;

/// In-memory EEPROM with `N` bytes of device capacity
#[derive(Debug, Clone)]
pub struct MemEeprom<const N: usize> {
    /// Contents that survive a power cycle
    durable: [u8; N],
    /// Write-back buffer seen by reads
    working: [u8; N],
    /// Size of the reserved region (0 until `init`)
    capacity: usize,
    /// Total `write_byte` calls since creation
    byte_writes: usize,
    /// Total `commit` calls since creation
    commits: usize,
}

impl<const N: usize> Default for MemEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemEeprom<N> {
    /// Create a blank (erased) device
    pub const fn new() -> Self {
        Self::with_contents([ERASED_BYTE; N])
    }

    /// Create a device whose durable contents are `contents`
    pub const fn with_contents(contents: [u8; N]) -> Self {
        Self {
            durable: contents,
            working: contents,
            capacity: 0,
            byte_writes: 0,
            commits: 0,
        }
    }

    /// Durable (committed) contents
    pub fn contents(&self) -> &[u8; N] {
        &self.durable
    }

    /// Mutable access to the durable contents, bypassing the write counters
    ///
    /// Intended for fault injection: corrupt a byte, then `power_cycle` so
    /// the working buffer picks it up.
    pub fn contents_mut(&mut self) -> &mut [u8; N] {
        &mut self.durable
    }

    /// Simulate power loss and restart
    ///
    /// Uncommitted writes are lost and the region must be re-initialized.
    pub fn power_cycle(&mut self) {
        self.working = self.durable;
        self.capacity = 0;
    }

    /// Number of `write_byte` calls so far
    pub fn byte_writes(&self) -> usize {
        self.byte_writes
    }

    /// Number of `commit` calls so far
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Whether the working buffer holds writes not yet committed
    pub fn has_pending_writes(&self) -> bool {
        self.working != self.durable
    }
}

impl<const N: usize> Eeprom for MemEeprom<N> {
    fn init(&mut self, capacity: usize) -> Result<(), EepromError> {
        if capacity > N {
            return Err(EepromError::CapacityTooLarge);
        }
        self.capacity = capacity;
        Ok(())
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, EepromError> {
        check_offset(offset, self.capacity)?;
        Ok(self.working[offset])
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), EepromError> {
        check_offset(offset, self.capacity)?;
        self.working[offset] = value;
        self.byte_writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        if self.capacity == 0 {
            return Err(EepromError::NotInitialized);
        }
        self.durable = self.working;
        self.commits += 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
