//! Application core: the automation that sits on top of the bus.
//!
//! The presence detector, console and network time are outside this
//! crate; they reach the controller only through bus messages.  Platform
//! access goes through the port traits in [`ports`].

pub mod controller;
pub mod ports;

pub use controller::ApplicationControl;
