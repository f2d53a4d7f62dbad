//! Persisted device settings
//!
//! Lives in the last flash sector (see `memory.x`) and survives resets and
//! firmware updates that keep the layout. Adding or removing a field
//! changes the record size, so the first boot after such an update starts
//! from defaults.

use bytemuck::{Pod, Zeroable};
use defmt::*;

use flashsettings_core::{FlashSettings, LoadError};
use flashsettings_hal_rp2040::flash::{Rp2040Eeprom, SETTINGS_REGION_SIZE};

/// Blink periods selectable with the button, in milliseconds
pub const BLINK_PERIODS_MS: [u16; 4] = [100, 250, 500, 1000];

/// Settings fields
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSettings {
    /// Number of boots since the settings were last reset
    pub boot_count: u32,
    /// Index into [`BLINK_PERIODS_MS`]
    pub blink_index: u8,
    /// Whether the LED blinks at all
    pub blink_enabled: u8,
    /// Button presses since the settings were last reset
    pub button_presses: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            boot_count: 0,
            blink_index: 2,
            blink_enabled: 1,
            button_presses: 0,
        }
    }
}

impl DeviceSettings {
    /// Current blink period in milliseconds
    pub fn blink_period_ms(&self) -> u16 {
        BLINK_PERIODS_MS[self.blink_index as usize % BLINK_PERIODS_MS.len()]
    }

    /// Step to the next blink period, wrapping around
    pub fn next_blink_period(&mut self) {
        self.blink_index = ((self.blink_index as usize + 1) % BLINK_PERIODS_MS.len()) as u8;
    }
}

/// Settings record stored in the RP2040 flash settings region
pub type Settings = FlashSettings<Rp2040Eeprom<'static>, DeviceSettings, SETTINGS_REGION_SIZE>;

/// Load settings, logging why defaults are used if the stored record is rejected
pub fn load(settings: &mut Settings) {
    match settings.try_load() {
        Ok(()) => info!("Loaded settings: {}", settings.payload()),
        Err(LoadError::SizeMismatch { stored, expected }) => {
            info!(
                "Settings layout changed ({} -> {} bytes) or never saved, using defaults",
                stored, expected
            );
        }
        Err(LoadError::ChecksumMismatch { stored, computed }) => {
            warn!(
                "Settings corrupted (checksum {:#x} != {:#x}), using defaults",
                stored, computed
            );
        }
        Err(LoadError::Storage(e)) => {
            error!("Failed to read settings: {:?}, using defaults", e);
        }
    }
}
