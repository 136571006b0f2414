//! Desk control-unit protocol.
//!
//! The desk base polls its controller by broadcasting a 6-byte trigger
//! frame.  A command is delivered by answering several consecutive
//! triggers with the same 8-byte command frame while a wake line is held
//! high.  The same byte stream also carries the 7-segment display contents,
//! from which the current height is decoded.
//!
//! ```text
//!  serial rx ──┬──▶ TriggerMatcher ──match──▶ ArmSequencer ──frame──▶ serial tx
//!              │                                   ▲
//!              │                     DeskCommand ──┘ (bus)
//!              └──▶ TelemetryDecoder ──▶ last height ──▶ DeskHeightReport (bus)
//! ```

pub mod control;
pub mod frame;
pub mod link;
pub mod protocol;
pub mod sequencer;
pub mod telemetry;
pub mod trigger;

pub use control::DeskControl;
pub use link::SerialLink;
pub use protocol::DeskProtocol;

use serde::{Deserialize, Serialize};

/// Logical desk commands, carried as a 1-byte id on [`Topic::DeskCommand`](crate::bus::Topic::DeskCommand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DeskCommand {
    Wake = 0,
    Up = 1,
    Down = 2,
    Memory = 3,
    Preset1 = 4,
    Preset2 = 5,
    Preset3 = 6,
    Preset4 = 7,
    /// Resolves to whichever of `Preset1`/`Preset2` was not selected last.
    Toggle = 8,
}

impl DeskCommand {
    pub const ALL: [DeskCommand; 9] = [
        Self::Wake,
        Self::Up,
        Self::Down,
        Self::Memory,
        Self::Preset1,
        Self::Preset2,
        Self::Preset3,
        Self::Preset4,
        Self::Toggle,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub const fn is_preset(self) -> bool {
        matches!(
            self,
            Self::Preset1 | Self::Preset2 | Self::Preset3 | Self::Preset4
        )
    }
}
