//! EEPROM emulation on NOR flash
//!
//! NOR flash can only be erased in whole sectors, so byte-granular writes
//! go into a RAM mirror of the region and [`commit`](Eeprom::commit) erases
//! the region and programs the mirror back in one pass. Commits with
//! nothing changed skip the erase cycle entirely.
//!
//! Works with any driver implementing `embedded_storage::nor_flash::NorFlash`
//! (embassy-rp, embassy-stm32, esp-storage, ...).

use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind};

use crate::eeprom::{check_offset, Eeprom, EepromError};

impl From<NorFlashErrorKind> for EepromError {
    fn from(kind: NorFlashErrorKind) -> Self {
        match kind {
            NorFlashErrorKind::OutOfBounds => EepromError::OutOfBounds,
            NorFlashErrorKind::NotAligned => EepromError::Misaligned,
            _ => EepromError::Flash,
        }
    }
}

/// EEPROM emulated in an `N`-byte region of NOR flash
///
/// `N` must be a multiple of the flash's erase size and the region must
/// start on an erase boundary; [`NorFlashEeprom::new`] checks both.
pub struct NorFlashEeprom<F, const N: usize> {
    flash: F,
    /// Absolute flash offset of the region
    base: u32,
    /// RAM copy of the region
    mirror: [u8; N],
    /// Size of the reserved working region (0 until `init`)
    capacity: usize,
    /// Mirror differs from flash
    dirty: bool,
    /// Number of erase+program cycles performed by `commit`
    erase_cycles: u32,
}

impl<F: NorFlash, const N: usize> NorFlashEeprom<F, N> {
    /// Wrap `flash`, using `N` bytes starting at `base` as the EEPROM region
    pub fn new(flash: F, base: u32) -> Result<Self, EepromError> {
        let base_usize = base as usize;
        if base_usize % F::ERASE_SIZE != 0 || N % F::ERASE_SIZE != 0 || N == 0 {
            return Err(EepromError::Misaligned);
        }
        if base_usize + N > flash.capacity() {
            return Err(EepromError::OutOfBounds);
        }

        Ok(Self {
            flash,
            base,
            mirror: [0xFF; N],
            capacity: 0,
            dirty: false,
            erase_cycles: 0,
        })
    }

    /// Absolute flash offset of the region
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of erase cycles spent on this region since creation
    pub fn erase_cycles(&self) -> u32 {
        self.erase_cycles
    }

    /// Whether writes are waiting for a commit
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Release the underlying flash driver
    ///
    /// Uncommitted writes are discarded.
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn region_end(&self) -> u32 {
        self.base + N as u32
    }
}

impl<F: NorFlash, const N: usize> Eeprom for NorFlashEeprom<F, N> {
    /// Load the region into the RAM mirror
    ///
    /// Re-initializing discards writes that were never committed.
    fn init(&mut self, capacity: usize) -> Result<(), EepromError> {
        if capacity > N {
            return Err(EepromError::CapacityTooLarge);
        }

        self.flash
            .read(self.base, &mut self.mirror)
            .map_err(|e| EepromError::from(e.kind()))?;

        self.capacity = capacity;
        self.dirty = false;
        Ok(())
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, EepromError> {
        check_offset(offset, self.capacity)?;
        Ok(self.mirror[offset])
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), EepromError> {
        check_offset(offset, self.capacity)?;
        if self.mirror[offset] != value {
            self.mirror[offset] = value;
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        if self.capacity == 0 {
            return Err(EepromError::NotInitialized);
        }
        if !self.dirty {
            return Ok(());
        }

        let end = self.region_end();
        self.flash
            .erase(self.base, end)
            .map_err(|e| EepromError::from(e.kind()))?;
        self.flash
            .write(self.base, &self.mirror)
            .map_err(|e| EepromError::from(e.kind()))?;

        self.dirty = false;
        self.erase_cycles += 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_storage::nor_flash::{ErrorType, ReadNorFlash};

    const SECTOR: usize = 64;
    const FLASH_BYTES: usize = 4 * SECTOR;

    /// NOR flash model: erase sets sectors to 0xFF, programming can only
    /// clear bits
    struct MockFlash {
        data: [u8; FLASH_BYTES],
        erases: usize,
        fail_writes: bool,
    }

    impl MockFlash {
        fn new() -> Self {
            Self {
                data: [0xFF; FLASH_BYTES],
                erases: 0,
                fail_writes: false,
            }
        }
    }

    impl ErrorType for MockFlash {
        type Error = NorFlashErrorKind;
    }

    impl ReadNorFlash for MockFlash {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            let end = start + bytes.len();
            if end > FLASH_BYTES {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            bytes.copy_from_slice(&self.data[start..end]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            FLASH_BYTES
        }
    }

    impl NorFlash for MockFlash {
        const WRITE_SIZE: usize = 4;
        const ERASE_SIZE: usize = SECTOR;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            let (from, to) = (from as usize, to as usize);
            if from % SECTOR != 0 || to % SECTOR != 0 {
                return Err(NorFlashErrorKind::NotAligned);
            }
            if to > FLASH_BYTES {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            self.data[from..to].fill(0xFF);
            self.erases += (to - from) / SECTOR;
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err(NorFlashErrorKind::Other);
            }
            let start = offset as usize;
            if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
                return Err(NorFlashErrorKind::NotAligned);
            }
            for (cell, &byte) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
                *cell &= byte;
            }
            Ok(())
        }
    }

    #[test]
    fn test_new_checks_region_alignment() {
        assert_eq!(
            NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 10).err(),
            Some(EepromError::Misaligned)
        );
        assert_eq!(
            NorFlashEeprom::<_, 100>::new(MockFlash::new(), 0).err(),
            Some(EepromError::Misaligned)
        );
        assert_eq!(
            NorFlashEeprom::<_, { 2 * SECTOR }>::new(MockFlash::new(), (3 * SECTOR) as u32).err(),
            Some(EepromError::OutOfBounds)
        );
    }

    #[test]
    fn test_init_rejects_capacity_beyond_region() {
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 0).unwrap();
        assert_eq!(eeprom.init(SECTOR + 1), Err(EepromError::CapacityTooLarge));
    }

    #[test]
    fn test_commit_persists_across_reinit() {
        let base = (2 * SECTOR) as u32;
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), base).unwrap();
        eeprom.init(32).unwrap();
        eeprom.write(0, &[0x12, 0x34, 0x56]).unwrap();
        eeprom.commit().unwrap();

        let flash = eeprom.into_inner();
        assert_eq!(flash.data[2 * SECTOR..2 * SECTOR + 3], [0x12, 0x34, 0x56]);
        // Neighbouring sectors untouched
        assert_eq!(flash.data[SECTOR], 0xFF);
        assert_eq!(flash.erases, 1);

        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(flash, base).unwrap();
        eeprom.init(32).unwrap();
        let mut buffer = [0u8; 3];
        eeprom.read(0, &mut buffer).unwrap();
        assert_eq!(buffer, [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_rewriting_cleared_bits_survives_erase() {
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 0).unwrap();
        eeprom.init(8).unwrap();
        eeprom.write_byte(0, 0x00).unwrap();
        eeprom.commit().unwrap();

        // 0x00 -> 0xA5 needs bits set again, which only works via erase
        eeprom.write_byte(0, 0xA5).unwrap();
        eeprom.commit().unwrap();

        eeprom.init(8).unwrap();
        assert_eq!(eeprom.read_byte(0), Ok(0xA5));
        assert_eq!(eeprom.erase_cycles(), 2);
    }

    #[test]
    fn test_clean_commit_skips_erase() {
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 0).unwrap();
        eeprom.init(8).unwrap();

        // Writing the value already stored does not dirty the mirror
        eeprom.write_byte(0, 0xFF).unwrap();
        assert!(!eeprom.is_dirty());
        eeprom.commit().unwrap();

        assert_eq!(eeprom.erase_cycles(), 0);
        assert_eq!(eeprom.into_inner().erases, 0);
    }

    #[test]
    fn test_reinit_discards_uncommitted_writes() {
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 0).unwrap();
        eeprom.init(8).unwrap();
        eeprom.write_byte(1, 0x11).unwrap();
        assert!(eeprom.is_dirty());

        eeprom.init(8).unwrap();
        assert_eq!(eeprom.read_byte(1), Ok(0xFF));
        assert!(!eeprom.is_dirty());
    }

    #[test]
    fn test_flash_failure_keeps_mirror_dirty() {
        let mut flash = MockFlash::new();
        flash.fail_writes = true;
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(flash, 0).unwrap();
        eeprom.init(8).unwrap();
        eeprom.write_byte(0, 0x01).unwrap();

        assert_eq!(eeprom.commit(), Err(EepromError::Flash));
        assert!(eeprom.is_dirty());
        assert_eq!(eeprom.erase_cycles(), 0);
    }

    #[test]
    fn test_commit_before_init() {
        let mut eeprom = NorFlashEeprom::<_, SECTOR>::new(MockFlash::new(), 0).unwrap();
        assert_eq!(eeprom.commit(), Err(EepromError::NotInitialized));
    }
}
