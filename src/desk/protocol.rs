//! Unlocked protocol core: matcher, sequencer, telemetry and wake line.
//!
//! `DeskProtocol` is plain single-owner state.  [`DeskControl`](super::DeskControl)
//! puts it behind a lock and connects it to the bus and the serial link.

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use super::DeskCommand;
use super::frame::frame_for;
use super::sequencer::{ArmSequencer, Release};
use super::telemetry::TelemetryDecoder;
use super::trigger::TriggerMatcher;

pub struct DeskProtocol<P: OutputPin> {
    trigger: TriggerMatcher,
    sequencer: ArmSequencer,
    telemetry: TelemetryDecoder,
    wake: P,
    repeats: u8,
    /// Preset the next toggle moves away from.
    toggle_position: DeskCommand,
    /// Set by [`halt`](Self::halt); never cleared.
    halted: bool,
    verbose: bool,
}

impl<P: OutputPin> DeskProtocol<P> {
    /// `repeats` transmissions per armed command.
    pub fn new(wake: P, repeats: u8) -> Self {
        Self {
            trigger: TriggerMatcher::new(),
            sequencer: ArmSequencer::Disarmed,
            telemetry: TelemetryDecoder::new(),
            wake,
            repeats,
            toggle_position: DeskCommand::Preset1,
            halted: false,
            verbose: false,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Map `Toggle` to the preset it stands for and remember the choice.
    /// Explicit `Preset1`/`Preset2` also move the remembered position.
    pub fn resolve(&mut self, command: DeskCommand) -> DeskCommand {
        let resolved = match command {
            DeskCommand::Toggle => match self.toggle_position {
                DeskCommand::Preset1 => DeskCommand::Preset2,
                _ => DeskCommand::Preset1,
            },
            other => other,
        };
        if matches!(resolved, DeskCommand::Preset1 | DeskCommand::Preset2) {
            self.toggle_position = resolved;
        }
        resolved
    }

    /// Stage `command` and raise the wake line.  Returns the concrete
    /// command that was armed, or `None` once halted.
    pub fn command(&mut self, command: DeskCommand) -> Option<DeskCommand> {
        if self.halted {
            warn!("desk: {command:?} ignored, actuation halted");
            return None;
        }
        let resolved = self.resolve(command);
        // `resolve` never yields `Toggle`, so a frame always exists.
        if let Some(frame) = frame_for(resolved) {
            if self.sequencer.is_armed() {
                debug!(
                    "desk: {} repeat(s) abandoned",
                    self.sequencer.repeats_remaining()
                );
            }
            self.sequencer.arm(*frame, self.repeats);
            self.set_wake(true);
            if self.verbose {
                info!("desk: armed {resolved:?} x{}", self.repeats);
            }
        }
        Some(resolved)
    }

    /// Feed one received byte.  Returns a frame to transmit when the byte
    /// completed a trigger while armed.
    pub fn on_byte(&mut self, byte: u8) -> Option<Release> {
        if let Some(h) = self.telemetry.push(byte) {
            if self.verbose {
                info!("desk: height {h:.1}");
            }
        }
        if !self.trigger.push(byte) {
            return None;
        }
        let release = self.sequencer.on_trigger()?;
        if release.last {
            self.set_wake(false);
            if self.verbose {
                info!("desk: sequence complete");
            }
        }
        Some(release)
    }

    /// Disarm, drop the wake line and refuse every later command.
    pub fn halt(&mut self) {
        self.halted = true;
        self.sequencer.disarm();
        self.set_wake(false);
    }

    pub fn is_armed(&self) -> bool {
        self.sequencer.is_armed()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn repeats_remaining(&self) -> u8 {
        self.sequencer.repeats_remaining()
    }

    pub fn last_height(&self) -> Option<f32> {
        self.telemetry.last_height()
    }

    pub fn toggle_position(&self) -> DeskCommand {
        self.toggle_position
    }

    fn set_wake(&mut self, high: bool) {
        let res = if high {
            self.wake.set_high()
        } else {
            self.wake.set_low()
        };
        if let Err(e) = res {
            warn!("desk: wake line write failed: {e:?}");
        }
    }
}
