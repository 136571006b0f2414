//! Streaming single-pattern matcher for the trigger frame.
//!
//! The last six bytes live in a ring.  `cursor` is the next slot to be
//! overwritten, which is also the oldest byte once the ring is full, so
//! `buf[(cursor + i) % 6]` walks the window in arrival order.

use super::frame::{TRIGGER, TRIGGER_FRAME_LEN};

#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    buf: [u8; TRIGGER_FRAME_LEN],
    cursor: usize,
    full: bool,
}

impl Default for TriggerMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerMatcher {
    pub const fn new() -> Self {
        Self {
            buf: [0; TRIGGER_FRAME_LEN],
            cursor: 0,
            full: false,
        }
    }

    /// Push one byte.  Returns `true` when the six most recent bytes,
    /// oldest first, equal the trigger frame.
    pub fn push(&mut self, byte: u8) -> bool {
        self.buf[self.cursor] = byte;
        self.cursor = (self.cursor + 1) % TRIGGER_FRAME_LEN;
        if self.cursor == 0 {
            self.full = true;
        }
        self.full
            && (0..TRIGGER_FRAME_LEN)
                .all(|i| self.buf[(self.cursor + i) % TRIGGER_FRAME_LEN] == TRIGGER[i])
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
