//! LED blink task
//!
//! Blinks the on-board LED with the period chosen in the settings. The
//! main loop publishes changes through the atomics below.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use embassy_rp::gpio::Output;
use embassy_time::Timer;

/// Half-period of the blink in milliseconds
pub static BLINK_PERIOD_MS: AtomicU16 = AtomicU16::new(500);

/// LED blinks when set, stays off otherwise
pub static BLINK_ENABLED: AtomicBool = AtomicBool::new(true);

#[embassy_executor::task]
pub async fn blink_task(mut led: Output<'static>) {
    loop {
        if BLINK_ENABLED.load(Ordering::Relaxed) {
            led.toggle();
        } else {
            led.set_low();
        }

        let period = BLINK_PERIOD_MS.load(Ordering::Relaxed);
        Timer::after_millis(period as u64).await;
    }
}
