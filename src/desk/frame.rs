//! Wire frames.
//!
//! Command frame:
//! ```text
//! ┌──────┬──────┬──────┬──────┬──────┬──────────┬──────────┬──────┐
//! │ 0x9B │ 0x06 │ 0x02 │  b3  │  b4  │ crc (hi) │ crc (lo) │ 0x9D │
//! └──────┴──────┴──────┴──────┴──────┴──────────┴──────────┴──────┘
//! ```
//! The checksum is CRC-16/MODBUS over bytes 1..5.  All frames are built at
//! compile time.

use super::DeskCommand;

pub const START: u8 = 0x9B;
pub const END: u8 = 0x9D;

pub const COMMAND_FRAME_LEN: usize = 8;
pub const TRIGGER_FRAME_LEN: usize = 6;

pub type CommandFrame = [u8; COMMAND_FRAME_LEN];

/// Broadcast by the desk base to solicit a command.
pub const TRIGGER: [u8; TRIGGER_FRAME_LEN] = [START, 0x04, 0x11, 0x7C, 0xC3, END];

/// CRC-16/MODBUS (reflected poly 0xA001, init 0xFFFF).
pub const fn crc16_modbus(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    let mut i = 0;
    while i < data.len() {
        crc ^= data[i] as u16;
        let mut bit = 0;
        while bit < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        i += 1;
    }
    crc
}

const fn command_frame(b3: u8, b4: u8) -> CommandFrame {
    let crc = crc16_modbus(&[0x06, 0x02, b3, b4]);
    [
        START,
        0x06,
        0x02,
        b3,
        b4,
        (crc >> 8) as u8,
        (crc & 0xFF) as u8,
        END,
    ]
}

pub const WAKE: CommandFrame = command_frame(0x00, 0x00);
pub const UP: CommandFrame = command_frame(0x01, 0x00);
pub const DOWN: CommandFrame = command_frame(0x02, 0x00);
pub const MEMORY: CommandFrame = command_frame(0x20, 0x00);
pub const PRESET1: CommandFrame = command_frame(0x04, 0x00);
pub const PRESET2: CommandFrame = command_frame(0x08, 0x00);
pub const PRESET3: CommandFrame = command_frame(0x10, 0x00);
pub const PRESET4: CommandFrame = command_frame(0x00, 0x01);

/// The fixed frame for a concrete command.  `Toggle` has no frame of its
/// own and yields `None`; resolve it first.
pub const fn frame_for(command: DeskCommand) -> Option<&'static CommandFrame> {
    match command {
        DeskCommand::Wake => Some(&WAKE),
        DeskCommand::Up => Some(&UP),
        DeskCommand::Down => Some(&DOWN),
        DeskCommand::Memory => Some(&MEMORY),
        DeskCommand::Preset1 => Some(&PRESET1),
        DeskCommand::Preset2 => Some(&PRESET2),
        DeskCommand::Preset3 => Some(&PRESET3),
        DeskCommand::Preset4 => Some(&PRESET4),
        DeskCommand::Toggle => None,
    }
}
