//! LED data transport
//!
//! Single-wire LED chips (WS2812, SK6812) need cycle-exact waveforms that
//! are produced by PIO, RMT or SPI tricks on the target. Drivers hand the
//! fully formatted pixel bytes to an implementation of this trait and never
//! deal with bit timing themselves.

/// Timing-critical LED data output
pub trait LedTransport {
    /// Error type for transmit operations
    type Error;

    /// Transmit the encoded pixel bytes and latch them
    ///
    /// May block (or disable interrupts) for the duration of the transfer.
    fn transmit(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: LedTransport + ?Sized> LedTransport for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).transmit(data)
    }
}
