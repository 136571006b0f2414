//! Height telemetry decoder.
//!
//! Wire format:
//! ```text
//! ┌──────┬─────┬──────┬────────┬────────┬────────┬─────┐
//! │ 0x9B │ len │ 0x12 │ digit1 │ digit2 │ digit3 │ ... │   total = len + 2
//! └──────┴─────┴──────┴────────┴────────┴────────┴─────┘
//! ```
//!
//! Each digit byte is a 7-segment bitmask; bit 7 is the decimal point.
//! Frames of other types, frames with an unknown segment pattern and
//! frames longer than [`CAPACITY`] are dropped and the framer
//! resynchronises on the next start byte.

use super::frame::START;

/// Largest frame the framer assembles, start and length bytes included.
pub const CAPACITY: usize = 16;

/// Type byte of a height frame.
pub const HEIGHT_TYPE: u8 = 0x12;

const DECIMAL_POINT: u8 = 0x80;
/// Start, length, type and three digits.
const HEIGHT_FRAME_MIN: usize = 6;

/// Segment mask (bit 7 cleared) to digit.
pub fn segment_digit(pattern: u8) -> Option<u8> {
    match pattern & !DECIMAL_POINT {
        0x3F => Some(0),
        0x06 => Some(1),
        0x5B => Some(2),
        0x4F => Some(3),
        0x66 => Some(4),
        0x6D => Some(5),
        0x7D => Some(6),
        0x07 => Some(7),
        0x7F => Some(8),
        0x6F => Some(9),
        _ => None,
    }
}

/// Decode three digit bytes into a height.  `None` if any is unknown.
pub fn decode_height(digits: [u8; 3]) -> Option<f32> {
    let d1 = segment_digit(digits[0])?;
    let d2 = segment_digit(digits[1])?;
    let d3 = segment_digit(digits[2])?;
    let raw = f32::from(u16::from(d1) * 100 + u16::from(d2) * 10 + u16::from(d3));
    if digits[1] & DECIMAL_POINT != 0 {
        Some(raw / 10.0)
    } else {
        Some(raw)
    }
}

/// Framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    /// Outside a frame, waiting for `START`.
    Seeking,
    /// Start byte seen, length byte next.
    ReadingLength,
    /// Buffering until `expected` bytes are held.
    ReadingBody { expected: usize, collected: usize },
}

#[derive(Debug, Clone)]
pub struct TelemetryDecoder {
    state: FramerState,
    buf: [u8; CAPACITY],
    last_height: Option<f32>,
}

impl Default for TelemetryDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryDecoder {
    pub const fn new() -> Self {
        Self {
            state: FramerState::Seeking,
            buf: [0; CAPACITY],
            last_height: None,
        }
    }

    /// Last successfully decoded height, in display units.
    pub fn last_height(&self) -> Option<f32> {
        self.last_height
    }

    /// Feed one byte.  Returns the height when this byte completed a valid
    /// height frame.
    pub fn push(&mut self, byte: u8) -> Option<f32> {
        match self.state {
            FramerState::Seeking => {
                if byte == START {
                    self.buf[0] = byte;
                    self.state = FramerState::ReadingLength;
                }
                None
            }
            FramerState::ReadingLength => {
                let expected = usize::from(byte) + 2;
                if expected > CAPACITY {
                    // Overflow.
                    self.state = FramerState::Seeking;
                    return None;
                }
                self.buf[1] = byte;
                self.state = FramerState::ReadingBody {
                    expected,
                    collected: 2,
                };
                self.complete_if_done()
            }
            FramerState::ReadingBody {
                expected,
                collected,
            } => {
                self.buf[collected] = byte;
                self.state = FramerState::ReadingBody {
                    expected,
                    collected: collected + 1,
                };
                self.complete_if_done()
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = FramerState::Seeking;
    }

    fn complete_if_done(&mut self) -> Option<f32> {
        let FramerState::ReadingBody {
            expected,
            collected,
        } = self.state
        else {
            return None;
        };
        if collected < expected {
            return None;
        }
        self.state = FramerState::Seeking;
        if expected < HEIGHT_FRAME_MIN || self.buf[2] != HEIGHT_TYPE {
            return None;
        }
        let height = decode_height([self.buf[3], self.buf[4], self.buf[5]])?;
        self.last_height = Some(height);
        Some(height)
    }
}
