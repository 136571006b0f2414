//! Topic registry.
//!
//! Topics form a dense id range `FIRST_TOPIC < id < LAST_TOPIC`.  The
//! payload schema of every topic is a convention shared by its producers
//! and consumers (see [`super::payload`]); the bus itself only moves bytes.

use crate::error::BusError;

/// Boundary marker below the first valid id.  Never a real topic.
pub const FIRST_TOPIC: u16 = 0;
/// Boundary marker above the last valid id.  Never a real topic.
pub const LAST_TOPIC: u16 = Topic::COUNT as u16 + 1;

/// Every message category on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Topic {
    // ── Logging control (1-byte bool) ─────────────────────
    LogApplicationControl = 1,
    LogDeskControl = 2,
    LogPresenceDetector = 3,

    // ── Desk control ──────────────────────────────────────
    /// Move the desk: 1-byte [`DeskCommand`](crate::desk::DeskCommand) id.
    DeskCommand = 4,
    /// Toggle between the two sitting/standing presets (empty).
    DeskToggle = 5,
    /// Ask for the last decoded height (empty).
    DeskHeightQuery = 6,
    /// Answer to [`Topic::DeskHeightQuery`].
    DeskHeightReport = 7,

    // ── Presence (published by the occupancy estimator) ───
    PresenceDetected = 8,
    PresenceLost = 9,

    // ── Countdown timer ───────────────────────────────────
    /// Start (or restart) the countdown: u32 milliseconds.
    CountdownStart = 10,
    CountdownStop = 11,
    CountdownFinished = 12,

    // ── Application control configuration ─────────────────
    /// Set the posture-change interval: u32 minutes.
    TimerIntervalSet = 13,
    TimerIntervalQuery = 14,
    TimerIntervalReport = 15,
}

impl Topic {
    /// Number of real topics.
    pub const COUNT: usize = 15;

    /// All topics in id order.
    pub const ALL: [Topic; Self::COUNT] = [
        Self::LogApplicationControl,
        Self::LogDeskControl,
        Self::LogPresenceDetector,
        Self::DeskCommand,
        Self::DeskToggle,
        Self::DeskHeightQuery,
        Self::DeskHeightReport,
        Self::PresenceDetected,
        Self::PresenceLost,
        Self::CountdownStart,
        Self::CountdownStop,
        Self::CountdownFinished,
        Self::TimerIntervalSet,
        Self::TimerIntervalQuery,
        Self::TimerIntervalReport,
    ];

    /// Wire id of this topic.
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Zero-based slot in the subscription table.
    pub(crate) const fn index(self) -> usize {
        (self as u16 - FIRST_TOPIC - 1) as usize
    }
}

impl TryFrom<u16> for Topic {
    type Error = BusError;

    fn try_from(id: u16) -> Result<Self, BusError> {
        if id <= FIRST_TOPIC || id >= LAST_TOPIC {
            return Err(BusError::TopicOutOfRange(id));
        }
        Ok(Self::ALL[(id - FIRST_TOPIC - 1) as usize])
    }
}
