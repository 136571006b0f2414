//! Fuzz target: `DeskProtocol::on_byte`
//!
//! Arms a command, then feeds arbitrary received bytes.  Whatever the
//! stream, the protocol must never release more frames than the repeat
//! count, must release exactly one per trigger while armed, and must
//! leave the wake line low once the sequence is done.
//!
//! cargo fuzz run fuzz_desk_stream

#![no_main]

use std::convert::Infallible;

use deskpilot::desk::frame::PRESET1;
use deskpilot::desk::trigger::TriggerMatcher;
use deskpilot::desk::{DeskCommand, DeskProtocol};
use embedded_hal::digital::{ErrorType, OutputPin};
use libfuzzer_sys::fuzz_target;

const REPEATS: u8 = 5;

struct Wake<'a>(&'a mut bool);

impl ErrorType for Wake<'_> {
    type Error = Infallible;
}

impl OutputPin for Wake<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        *self.0 = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        *self.0 = true;
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut wake = false;
    let mut reference = TriggerMatcher::new();
    let mut released = 0u8;
    {
        let mut proto = DeskProtocol::new(Wake(&mut wake), REPEATS);
        proto.command(DeskCommand::Preset1);

        for &byte in data {
            let triggered = reference.push(byte);
            let armed = proto.is_armed();
            match proto.on_byte(byte) {
                Some(release) => {
                    assert!(triggered && armed, "release without an armed trigger");
                    assert_eq!(release.frame, PRESET1);
                    released += 1;
                    assert_eq!(release.last, released == REPEATS);
                }
                None => assert!(!(triggered && armed), "armed trigger was dropped"),
            }
        }
        assert!(released <= REPEATS);
        assert_eq!(proto.is_armed(), released < REPEATS);
    }
    assert_eq!(wake, released < REPEATS);
});
