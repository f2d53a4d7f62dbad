//! Flash-backed EEPROM for RP2040
//!
//! Reserves the last erase sector (4KB) of the 2MB flash for settings and
//! wraps embassy-rp's blocking flash driver in a
//! [`NorFlashEeprom`](flashsettings_hal::NorFlashEeprom).
//!
//! `memory.x` must keep program code out of this sector.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use flashsettings_hal::{EepromError, NorFlashEeprom};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico boards
pub const SETTINGS_REGION_SIZE: usize = ERASE_SIZE; // one 4KB sector
pub const SETTINGS_REGION_START: usize = FLASH_SIZE - SETTINGS_REGION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the settings region
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_REGION_START as u32)..(FLASH_SIZE as u32);

/// Blocking flash driver for the whole chip
pub type Rp2040Flash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// EEPROM emulated in the settings region
pub type Rp2040Eeprom<'d> = NorFlashEeprom<Rp2040Flash<'d>, SETTINGS_REGION_SIZE>;

/// Create the settings EEPROM from the flash peripheral
pub fn new_eeprom(flash: Peri<'_, FLASH>) -> Result<Rp2040Eeprom<'_>, EepromError> {
    let flash: Rp2040Flash<'_> = Flash::new_blocking(flash);
    NorFlashEeprom::new(flash, SETTINGS_RANGE.start)
}
