//! Serial link to the desk control unit.
//!
//! 9600 baud, 8N1, half-duplex.  The desk driver is generic over
//! `SerialLink`, so the UART adapter and the host test double are
//! interchangeable.

/// Byte-oriented half-duplex channel.
pub trait SerialLink {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf` without blocking.
    /// Returns 0 if nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
