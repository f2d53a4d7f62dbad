//! Embassy tasks

mod blink;

pub use blink::{blink_task, BLINK_ENABLED, BLINK_PERIOD_MS};
