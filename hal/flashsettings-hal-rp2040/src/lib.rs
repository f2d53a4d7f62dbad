//! RP2040-specific HAL for Flash Settings
//!
//! The RP2040 has no EEPROM, so settings live in the last sector of the
//! external QSPI flash, emulated as an EEPROM by
//! [`flashsettings_hal::NorFlashEeprom`].
//!
//! - Flash region layout constants
//! - [`flash::Rp2040Eeprom`] (implements `flashsettings_hal::Eeprom`)

#![no_std]

pub mod flash;

// Re-export shared traits from flashsettings-hal for convenience
pub use flashsettings_hal::{Eeprom, EepromError};
