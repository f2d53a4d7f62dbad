//! Flash Settings demo firmware
//!
//! Keeps a small settings record in the last flash sector of an RP2040:
//!
//! - On boot the record is loaded (or defaults are used) and the boot
//!   counter is bumped
//! - A short press on the button (GPIO 15 to GND) steps the blink period,
//!   a long press toggles blinking
//! - The main loop calls `save()` every iteration; flash is only erased
//!   and written when a setting actually changed

#![no_std]
#![no_main]

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use flashsettings_core::SaveOutcome;
use flashsettings_hal_rp2040::flash::new_eeprom;

use crate::settings::Settings;

mod settings;
mod tasks;

/// Button polling interval, also the save interval
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Presses longer than this toggle blinking instead of stepping the period
const LONG_PRESS: Duration = Duration::from_millis(800);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Flash Settings demo starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let eeprom = unwrap!(new_eeprom(p.FLASH));
    let mut settings = Settings::new(eeprom);
    settings::load(&mut settings);

    settings.boot_count = settings.boot_count.wrapping_add(1);
    info!("Boot #{}", settings.boot_count);
    persist(&mut settings);

    publish(&settings);

    let led = Output::new(p.PIN_25, Level::Low);
    spawner.spawn(tasks::blink_task(led)).unwrap();

    let button = Input::new(p.PIN_15, Pull::Up);
    let mut pressed_at: Option<Instant> = None;

    loop {
        match (button.is_low(), pressed_at) {
            (true, None) => pressed_at = Some(Instant::now()),
            (false, Some(start)) => {
                pressed_at = None;
                settings.button_presses = settings.button_presses.wrapping_add(1);

                if start.elapsed() >= LONG_PRESS {
                    settings.blink_enabled ^= 1;
                    info!("Blinking {}", if settings.blink_enabled != 0 { "on" } else { "off" });
                } else {
                    settings.next_blink_period();
                    info!("Blink period {} ms", settings.blink_period_ms());
                }
                publish(&settings);
            }
            _ => {}
        }

        // No-op unless a field changed since the last save
        persist(&mut settings);

        Timer::after(POLL_INTERVAL).await;
    }
}

/// Save settings if they changed
fn persist(settings: &mut Settings) {
    match settings.save() {
        Ok(SaveOutcome::Written) => debug!("Settings written to flash"),
        Ok(SaveOutcome::Unchanged) => {}
        Err(e) => error!("Failed to save settings: {:?}", e),
    }
}

/// Hand the blink configuration to the blink task
fn publish(settings: &Settings) {
    tasks::BLINK_PERIOD_MS.store(settings.blink_period_ms(), Ordering::Relaxed);
    tasks::BLINK_ENABLED.store(settings.blink_enabled != 0, Ordering::Relaxed);
}
