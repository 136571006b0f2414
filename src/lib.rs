//! DeskPilot firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bus;
pub mod config;
pub mod desk;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod supervisor;
pub mod tasks;
pub mod timer;

pub mod adapters;
pub mod drivers;
