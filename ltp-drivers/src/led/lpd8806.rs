//! LPD8806 SPI LED backend
//!
//! Each channel is 7 bits with the high bit always set, in GRB order. A run
//! of zero bytes (one per 32 pixels) latches the data; the chip treats any
//! byte without the high bit as part of the latch.

use embedded_hal::spi::SpiBus;
use ltp_core::{BufferInfo, Color, ColorFormat, LedDriver, LedError, LedType};

use super::pixel_buffer;

const BYTES_PER_PIXEL: u8 = 3;
const LATCH_CHUNK: [u8; 8] = [0x00; 8];

/// Channel value for "off"
const CHANNEL_OFF: u8 = 0x80;

#[inline]
const fn encode(value: u8) -> u8 {
    CHANNEL_OFF | (value >> 1)
}

#[inline]
const fn decode(byte: u8) -> u8 {
    (byte & 0x7F) << 1
}

/// LPD8806 strip driver
pub struct Lpd8806<'a, S> {
    buffer: &'a mut [u8],
    pixel_count: u16,
    spi: S,
}

impl<'a, S: SpiBus> Lpd8806<'a, S> {
    pub fn new(buffer: &'a mut [u8], pixel_count: u16, spi: S) -> Result<Self, LedError> {
        let buffer = pixel_buffer(buffer, pixel_count, BYTES_PER_PIXEL)?;
        buffer.fill(CHANNEL_OFF);
        Ok(Self {
            buffer,
            pixel_count,
            spi,
        })
    }

    pub fn spi(&self) -> &S {
        &self.spi
    }

    fn latch_len(&self) -> usize {
        (usize::from(self.pixel_count) + 31) / 32
    }

    fn offset(&self, index: u16) -> Option<usize> {
        (index < self.pixel_count).then(|| usize::from(index) * usize::from(BYTES_PER_PIXEL))
    }

    fn write_latch(&mut self) -> Result<(), S::Error> {
        let mut remaining = self.latch_len();
        while remaining > 0 {
            let n = remaining.min(LATCH_CHUNK.len());
            self.spi.write(&LATCH_CHUNK[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn write_frame(&mut self) -> Result<(), S::Error> {
        self.spi.write(&*self.buffer)?;
        self.write_latch()?;
        self.spi.flush()
    }
}

impl<S: SpiBus> LedDriver for Lpd8806<'_, S> {
    /// Reset the chain with a latch, then blank it
    fn begin(&mut self) -> Result<(), LedError> {
        self.write_latch().map_err(|_| LedError::Transport)?;
        self.clear();
        self.show()
    }

    fn buffer_info(&self) -> BufferInfo {
        BufferInfo {
            pixel_count: self.pixel_count,
            bytes_per_pixel: BYTES_PER_PIXEL,
            color_format: ColorFormat::Grb,
            led_type: LedType::Lpd8806,
        }
    }

    fn buffer(&self) -> &[u8] {
        &*self.buffer
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    fn set_pixel(&mut self, index: u16, color: Color) {
        if let Some(offset) = self.offset(index) {
            self.buffer[offset..offset + 3].copy_from_slice(&[
                encode(color.g),
                encode(color.r),
                encode(color.b),
            ]);
        }
    }

    /// Stored color, with the low bit of each channel lost
    fn pixel(&self, index: u16) -> Option<Color> {
        let offset = self.offset(index)?;
        let grb = &self.buffer[offset..offset + 3];
        Some(Color::rgb(decode(grb[1]), decode(grb[0]), decode(grb[2])))
    }

    fn clear(&mut self) {
        self.buffer.fill(CHANNEL_OFF);
    }

    fn show(&mut self) -> Result<(), LedError> {
        self.write_frame().map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("lpd8806: SPI write failed");
            LedError::Transport
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BusFault;

    impl embedded_hal::spi::Error for BusFault {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    #[derive(Default)]
    struct MockSpi {
        written: Vec<u8, 128>,
        fail: bool,
    }

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = BusFault;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(BusFault);
            }
            self.written.extend_from_slice(words).map_err(|_| BusFault)
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            let copy: Vec<u8, 128> = Vec::from_slice(words).map_err(|_| BusFault)?;
            self.write(&copy)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_channel_encoding() {
        let mut raw = [0u8; 6];
        let mut strip = Lpd8806::new(&mut raw, 2, MockSpi::default()).unwrap();
        assert!(strip.buffer().iter().all(|&b| b == 0x80));

        strip.set_pixel(0, Color::rgb(255, 128, 1));
        assert_eq!(&strip.buffer()[..3], &[0xC0, 0xFF, 0x80]);
        assert_eq!(strip.pixel(0), Some(Color::rgb(254, 128, 0)));
    }

    #[test]
    fn test_show_appends_latch() {
        let mut raw = [0u8; 3 * 33];
        let mut strip = Lpd8806::new(&mut raw, 33, MockSpi::default()).unwrap();
        strip.show().unwrap();

        let written = strip.spi().written.as_slice();
        // 99 pixel bytes then (33 + 31) / 32 = 2 latch bytes
        assert_eq!(written.len(), 101);
        assert_eq!(&written[99..], &[0, 0]);
    }

    #[test]
    fn test_begin_latches_then_blanks() {
        let mut raw = [0u8; 3];
        let mut strip = Lpd8806::new(&mut raw, 1, MockSpi::default()).unwrap();
        strip.set_pixel(0, Color::WHITE);
        strip.begin().unwrap();
        assert_eq!(
            strip.spi().written.as_slice(),
            &[0x00, 0x80, 0x80, 0x80, 0x00]
        );
    }

    #[test]
    fn test_bus_error_reported() {
        let mut raw = [0u8; 3];
        let spi = MockSpi {
            fail: true,
            ..MockSpi::default()
        };
        let mut strip = Lpd8806::new(&mut raw, 1, spi).unwrap();
        assert_eq!(strip.show(), Err(LedError::Transport));
        assert_eq!(strip.begin(), Err(LedError::Transport));
    }
}
