//! Payload conventions shared by producers and consumers.
//!
//! | Payload          | Size | Encoding                                  |
//! |------------------|------|-------------------------------------------|
//! | signal           | 0    | -                                         |
//! | bool             | 1    | `0` = false, `1` = true                   |
//! | u32              | 4    | little-endian                             |
//! | desk command     | 1    | [`DeskCommand`](crate::desk::DeskCommand) |
//! | height report    | 5    | validity flag, then f32 little-endian cm  |
//!
//! A payload that breaks its topic's convention is a wiring error, not a
//! transient fault, so every decoder returns [`BusError`].

use crate::error::BusError;

use super::Message;

pub const BOOL_LEN: u16 = 1;
pub const U32_LEN: u16 = 4;
pub const HEIGHT_REPORT_LEN: u16 = 5;

fn expect_len(message: &Message<'_>, expected: u16) -> Result<(), BusError> {
    if message.payload.len() != usize::from(expected) {
        return Err(BusError::PayloadSize {
            topic: message.topic,
            expected,
            actual: message.len(),
        });
    }
    Ok(())
}

/// Signals must carry no payload.
pub fn expect_signal(message: &Message<'_>) -> Result<(), BusError> {
    expect_len(message, 0)
}

pub fn encode_bool(value: bool) -> [u8; 1] {
    [u8::from(value)]
}

pub fn decode_bool(message: &Message<'_>) -> Result<bool, BusError> {
    expect_len(message, BOOL_LEN)?;
    match message.payload[0] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(BusError::PayloadValue(message.topic)),
    }
}

pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

pub fn decode_u32(message: &Message<'_>) -> Result<u32, BusError> {
    expect_len(message, U32_LEN)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(message.payload);
    Ok(u32::from_le_bytes(raw))
}

/// Single raw byte; the caller maps it to its own enum.
pub fn decode_u8(message: &Message<'_>) -> Result<u8, BusError> {
    expect_len(message, 1)?;
    Ok(message.payload[0])
}

/// Encode the last decoded desk height, `None` when nothing has been decoded yet.
pub fn encode_height(height_cm: Option<f32>) -> [u8; 5] {
    let mut out = [0u8; 5];
    if let Some(h) = height_cm {
        out[0] = 1;
        out[1..].copy_from_slice(&h.to_le_bytes());
    }
    out
}

pub fn decode_height(message: &Message<'_>) -> Result<Option<f32>, BusError> {
    expect_len(message, HEIGHT_REPORT_LEN)?;
    match message.payload[0] {
        0 => Ok(None),
        1 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&message.payload[1..]);
            Ok(Some(f32::from_le_bytes(raw)))
        }
        _ => Err(BusError::PayloadValue(message.topic)),
    }
}
