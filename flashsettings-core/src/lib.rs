//! Persistent settings for microcontrollers
//!
//! Stores one fixed-size, user-defined settings record at the start of an
//! EEPROM (or flash emulating one):
//!
//! - Record envelope (size + Fletcher-16 checksum header)
//! - Load with schema-change and corruption detection, falling back to
//!   the compiled-in defaults
//! - Conditional save that only touches storage when the record changed
//!
//! # Example
//!
//! ```
//! use bytemuck::{Pod, Zeroable};
//! use flashsettings_core::FlashSettings;
//! use flashsettings_hal::MemEeprom;
//!
//! #[repr(C)]
//! #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
//! struct Settings {
//!     brightness: u8,
//!     volume: u8,
//!     timeout_s: u16,
//! }
//!
//! let mut settings: FlashSettings<_, Settings> = FlashSettings::new(MemEeprom::<512>::new());
//! if !settings.load() {
//!     // blank or stale storage: running on defaults
//! }
//! settings.brightness = 80;
//! settings.save().unwrap();
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

// This mod must go first, so that the others see its macros.
mod fmt;

pub mod checksum;
pub mod envelope;
pub mod error;
pub mod settings;

pub use checksum::{fletcher16, Fletcher16};
pub use envelope::Envelope;
pub use error::LoadError;
pub use settings::{FlashSettings, SaveOutcome, DEFAULT_PARTITION_SIZE};

// Storage types are part of the public API
pub use flashsettings_hal::{Eeprom, EepromError};
