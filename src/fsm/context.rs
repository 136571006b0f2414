//! Condition flags and settings threaded through the automation actions.
//!
//! `AutomationContext` is what the desk-automation state actions read and
//! write.  It remembers what the actions have already asked for (a posture
//! command, a running countdown) so that re-running an action on a
//! self-loop publishes nothing new.

use crate::config::DeskConfig;
use crate::desk::DeskCommand;

/// Which posture the controller last commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posture {
    Sitting,
    Standing,
}

pub struct AutomationContext {
    // -- Flags maintained by the actions --
    /// A `CountdownStart` is outstanding and has neither finished nor
    /// been stopped.
    pub countdown_running: bool,
    /// Last posture commanded; `None` until the first command.
    pub posture: Option<Posture>,

    // -- Settings --
    /// Minutes between posture changes.
    pub interval_minutes: u32,
    pub sit_command: DeskCommand,
    pub stand_command: DeskCommand,
    /// Promote per-message traces to `info!`.
    pub verbose: bool,
}

impl AutomationContext {
    pub fn new(config: &DeskConfig) -> Self {
        Self {
            countdown_running: false,
            posture: None,
            interval_minutes: config.default_interval_minutes,
            sit_command: config.sit_command,
            stand_command: config.stand_command,
            verbose: false,
        }
    }

    /// The current interval in milliseconds, as carried by `CountdownStart`.
    pub fn interval_ms(&self) -> u32 {
        self.interval_minutes.saturating_mul(60_000)
    }
}
