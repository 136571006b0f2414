//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements            | Connects to              |
//! |------------|-----------------------|--------------------------|
//! | `log_sink` | `Subscriber` (reports)| Serial log output        |
//! | `time`     | `Clock`               | ESP32 system timer       |
//! | `uart`     | `SerialLink`          | ESP-IDF UART driver      |

pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
