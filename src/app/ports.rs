//! Port traits: the boundary between the automation logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TimerManager / ApplicationControl
//! ```
//!
//! Serial I/O has its own port, [`SerialLink`](crate::desk::SerialLink),
//! next to the protocol that speaks over it.

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: platform → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock: Sync {
    /// Milliseconds since an arbitrary fixed origin; never goes backwards.
    fn now_ms(&self) -> u64;
}
