//! Arm / repeat sequencing.
//!
//! ```text
//!            arm(frame)                   trigger (n > 1)
//!  DISARMED ───────────▶ ARMED{frame, n} ─────────────────▶ ARMED{frame, n-1}
//!     ▲                      │   ▲                               │
//!     │     trigger (n == 1) │   └────── arm(other) overwrites ──┘
//!     └──────────────────────┘
//! ```
//!
//! Re-arming abandons whatever repeats were left.  There is no queue.

use super::frame::CommandFrame;

/// Transmissions per command unless configured otherwise.
pub const DEFAULT_REPEATS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmSequencer {
    #[default]
    Disarmed,
    Armed {
        frame: CommandFrame,
        repeats_remaining: u8,
    },
}

/// A frame the sequencer wants on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub frame: CommandFrame,
    /// This was the final repeat; the sequencer is now disarmed.
    pub last: bool,
}

impl ArmSequencer {
    /// Stage `frame` for `repeats` transmissions.  `repeats == 0` disarms.
    pub fn arm(&mut self, frame: CommandFrame, repeats: u8) {
        *self = if repeats == 0 {
            Self::Disarmed
        } else {
            Self::Armed {
                frame,
                repeats_remaining: repeats,
            }
        };
    }

    pub fn disarm(&mut self) {
        *self = Self::Disarmed;
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    pub fn repeats_remaining(&self) -> u8 {
        match self {
            Self::Disarmed => 0,
            Self::Armed {
                repeats_remaining, ..
            } => *repeats_remaining,
        }
    }

    /// Consume one repeat for a trigger match.  `None` while disarmed.
    pub fn on_trigger(&mut self) -> Option<Release> {
        let Self::Armed {
            frame,
            repeats_remaining,
        } = self
        else {
            return None;
        };
        let frame = *frame;
        *repeats_remaining -= 1;
        let last = *repeats_remaining == 0;
        if last {
            *self = Self::Disarmed;
        }
        Some(Release { frame, last })
    }
}
