//! Flash Settings Hardware Abstraction Layer
//!
//! This crate defines the byte-addressable storage device that the settings
//! engine in `flashsettings-core` persists into, plus device implementations
//! that can be shared between chips.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (flashsettings-firmware)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flashsettings-core (FlashSettings)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flashsettings-hal (this crate - trait) │
//! └─────────────────────────────────────────┘
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   MemEeprom   │       │ NorFlashEeprom│
//! │  (host, RAM)  │       │ (rp2040, ...) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`eeprom::Eeprom`] - Byte-addressable persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod mem;
#[cfg(feature = "nor-flash")]
pub mod nor;

// Re-export key types at crate root for convenience
pub use eeprom::{Eeprom, EepromError};
pub use mem::MemEeprom;
#[cfg(feature = "nor-flash")]
pub use nor::NorFlashEeprom;
