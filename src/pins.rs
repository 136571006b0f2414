//! GPIO / peripheral pin assignments for the DeskPilot board.
//!
//! Single source of truth: the binary builds every pin driver from these
//! numbers rather than hard-coding them.

// ---------------------------------------------------------------------------
// Desk control-unit link (RJ45 to the desk base)
// ---------------------------------------------------------------------------

/// UART TX to the control unit's RX line.
pub const DESK_UART_TX_GPIO: i32 = 17;
/// UART RX from the control unit's TX line.
pub const DESK_UART_RX_GPIO: i32 = 16;
/// Wake/hold line; held HIGH while a command is being delivered.
pub const DESK_WAKE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Status LED (active HIGH); blinks on a fatal halt.
pub const STATUS_LED_GPIO: i32 = 15;
