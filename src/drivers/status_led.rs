//! Status LED driver.
//!
//! A single GPIO LED.  Off while the system runs normally; the main loop
//! toggles it at the fatal blink interval once the supervisor halts.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Takes the pin and switches it off.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        let res = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match res {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("status LED write failed: {e:?}"),
        }
    }

    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
