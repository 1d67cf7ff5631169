//! UART serial communication abstractions
//!
//! The link layer polls the receiver without ever blocking, so the receive
//! side is expressed as "give me one byte if one is already buffered".

use embedded_io::{Read, ReadReady, Write};

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is already available
    ///
    /// Returns `Ok(None)` immediately when the receive buffer is empty.
    /// Implementations must never wait for data to arrive.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Drain up to `buf.len()` already-available bytes
    ///
    /// Returns the number of bytes written into `buf`.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        while count < buf.len() {
            match self.try_read_byte()? {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

/// Adapter exposing any `embedded-io` serial port through [`UartRx`]/[`UartTx`]
///
/// Uses [`ReadReady`] to guarantee the receive path never blocks.
#[derive(Debug)]
pub struct EmbeddedIoUart<T> {
    inner: T,
}

impl<T> EmbeddedIoUart<T> {
    /// Wrap an `embedded-io` port
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Get access to the wrapped port
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Get mutable access to the wrapped port
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Release the wrapped port
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> UartRx for EmbeddedIoUart<T> {
    type Error = T::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        let n = self.inner.read(&mut buf)?;
        Ok(if n == 1 { Some(buf[0]) } else { None })
    }
}

impl<T: Write> UartTx for EmbeddedIoUart<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Fifo {
        data: [u8; 8],
        head: usize,
        len: usize,
    }

    impl embedded_io::ErrorType for Fifo {
        type Error = Infallible;
    }

    impl Read for Fifo {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.len - self.head);
            buf[..n].copy_from_slice(&self.data[self.head..self.head + n]);
            self.head += n;
            Ok(n)
        }
    }

    impl ReadReady for Fifo {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.head < self.len)
        }
    }

    #[test]
    fn test_embedded_io_adapter_never_blocks() {
        let fifo = Fifo {
            data: [0xAA, 0x01, 0x02, 0, 0, 0, 0, 0],
            head: 0,
            len: 3,
        };
        let mut uart = EmbeddedIoUart::new(fifo);

        assert_eq!(uart.try_read_byte(), Ok(Some(0xAA)));
        let mut buf = [0u8; 8];
        assert_eq!(uart.read_available(&mut buf), Ok(2));
        assert_eq!(&buf[..2], &[0x01, 0x02]);
        assert_eq!(uart.try_read_byte(), Ok(None));
    }
}
