//! Peripheral drivers and thread helpers.

pub mod status_led;
pub mod task_pin;
