//! Fault supervisor.
//!
//! Structural errors are not retried.  The task that sees one reports it
//! here, and from then on:
//!
//! 1. The first fault is latched and logged at `error!`; later ones are
//!    logged at `warn!` only.
//! 2. [`FaultSupervisor::is_halted`] turns true.  Every task loop checks it
//!    and stops; the desk-io task disarms the desk on its way out.
//! 3. The main loop switches the status LED to the fatal blink.
//!
//! Panics take the same path through the hook installed by
//! [`FaultSupervisor::install_panic_hook`].

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{error, warn};

use crate::error::Error;

/// What stopped the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error {
        origin: &'static str,
        error: Error,
    },
    Panic,
}

pub struct FaultSupervisor {
    halted: AtomicBool,
    first: Mutex<CriticalSectionRawMutex, Cell<Option<Fault>>>,
}

impl Default for FaultSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultSupervisor {
    pub const fn new() -> Self {
        Self {
            halted: AtomicBool::new(false),
            first: Mutex::new(Cell::new(None)),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// The fault that caused the halt, if any.
    pub fn first_fault(&self) -> Option<Fault> {
        self.first.lock(Cell::get)
    }

    /// Latch `error` from `origin` and halt.  Returns `true` if this was
    /// the first fault.
    pub fn report(&self, origin: &'static str, error: Error) -> bool {
        self.latch(Fault::Error { origin, error })
    }

    /// Pass `result` through, reporting the error if there is one.
    pub fn check<T>(&self, origin: &'static str, result: crate::error::Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.report(origin, e);
                None
            }
        }
    }

    fn latch(&self, fault: Fault) -> bool {
        let first = self.first.lock(|slot| {
            if slot.get().is_some() {
                return false;
            }
            slot.set(Some(fault));
            true
        });
        self.halted.store(true, Ordering::Release);
        match (first, fault) {
            (true, Fault::Error { origin, error }) => {
                error!("FATAL [{origin}]: {error}; actuation halted");
            }
            (true, Fault::Panic) => error!("FATAL: panic; actuation halted"),
            (false, Fault::Error { origin, error }) => {
                warn!("further fault after halt [{origin}]: {error}");
            }
            (false, Fault::Panic) => warn!("further panic after halt"),
        }
        first
    }

    /// Route panics to the supervisor before the default hook runs.
    pub fn install_panic_hook(&'static self) {
        let default = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
                *msg
            } else if let Some(msg) = info.payload().downcast_ref::<String>() {
                msg.as_str()
            } else {
                "unknown panic"
            };
            error!("PANIC: {reason}");
            self.latch(Fault::Panic);
            default(info);
        }));
    }
}
