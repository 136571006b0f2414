//! System configuration parameters
//!
//! All tunable parameters for the DeskPilot controller.  The binary may
//! override the defaults with a JSON document supplied at build time.

use serde::{Deserialize, Serialize};

use crate::desk::DeskCommand;
use crate::error::{Error, Result};

/// The only line rate the desk control unit speaks.
pub const DESK_BAUD: u32 = 9600;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    // --- Desk protocol ---
    /// Transmissions per armed command
    pub command_repeats: u8,
    /// Serial line rate (8N1)
    pub serial_baud: u32,
    /// Serial drain period (milliseconds)
    pub serial_poll_interval_ms: u32,

    // --- Automation ---
    /// Countdown poll period (milliseconds)
    pub timer_poll_interval_ms: u32,
    /// Minutes between posture changes
    pub default_interval_minutes: u32,
    /// Preset commanded when the user should sit
    pub sit_command: DeskCommand,
    /// Preset commanded when the user should stand
    pub stand_command: DeskCommand,

    // --- Boot / diagnostics ---
    /// Delay after wiring before the poll tasks start (milliseconds)
    pub startup_settle_ms: u32,
    /// Half-period of the fatal-error LED blink (milliseconds)
    pub fatal_blink_interval_ms: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            command_repeats: 5,
            serial_baud: DESK_BAUD,
            serial_poll_interval_ms: 10,

            timer_poll_interval_ms: 100,
            default_interval_minutes: 45,
            sit_command: DeskCommand::Preset1,
            stand_command: DeskCommand::Preset2,

            startup_settle_ms: 1000,
            fatal_blink_interval_ms: 700,
        }
    }
}

impl DeskConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep their
    /// defaults.  The result is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_repeats == 0 {
            return Err(Error::Config("command_repeats must be > 0"));
        }
        if self.serial_baud != DESK_BAUD {
            return Err(Error::Config("serial_baud must be 9600"));
        }
        if self.serial_poll_interval_ms == 0 || self.timer_poll_interval_ms == 0 {
            return Err(Error::Config("poll intervals must be > 0"));
        }
        if self.default_interval_minutes == 0 {
            return Err(Error::Config("default_interval_minutes must be > 0"));
        }
        if self.fatal_blink_interval_ms == 0 {
            return Err(Error::Config("fatal_blink_interval_ms must be > 0"));
        }
        if !self.sit_command.is_preset() || !self.stand_command.is_preset() {
            return Err(Error::Config("posture commands must be presets"));
        }
        Ok(())
    }
}
