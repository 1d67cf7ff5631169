//! WS2812 / SK6812 single-wire LED backend
//!
//! Pixels are stored in wire order (GRB for WS2812, GRBW for SK6812) and
//! handed to an [`LedTransport`] that produces the bit timing. The
//! transport usually blocks with interrupts masked for the whole frame, so
//! `show()` should only be called once per frame.
//!
//! # Usage
//!
//! ```ignore
//! static mut PIXELS: [u8; 960 * 3] = [0; 960 * 3];
//!
//! let strip = Ws2812::new(&mut PIXELS, 960, pio_transport)?;
//! let mut leds = LedController::new(strip, topology)?;
//! leds.begin()?;
//! ```

use ltp_core::{BufferInfo, Color, ColorFormat, LedDriver, LedError, LedType};
use ltp_hal::LedTransport;

use super::{pack, pixel_buffer, unpack};

/// Single-wire LED strip driver
pub struct Ws2812<'a, T> {
    buffer: &'a mut [u8],
    pixel_count: u16,
    format: ColorFormat,
    led_type: LedType,
    transport: T,
}

impl<'a, T: LedTransport> Ws2812<'a, T> {
    /// WS2812 with GRB ordering
    pub fn new(buffer: &'a mut [u8], pixel_count: u16, transport: T) -> Result<Self, LedError> {
        Self::with_format(buffer, pixel_count, ColorFormat::Grb, transport)
    }

    /// SK6812 with GRBW ordering
    pub fn sk6812(buffer: &'a mut [u8], pixel_count: u16, transport: T) -> Result<Self, LedError> {
        let mut strip = Self::with_format(buffer, pixel_count, ColorFormat::Grbw, transport)?;
        strip.led_type = LedType::Sk6812;
        Ok(strip)
    }

    /// Arbitrary channel order, for clones wired RGB
    pub fn with_format(
        buffer: &'a mut [u8],
        pixel_count: u16,
        format: ColorFormat,
        transport: T,
    ) -> Result<Self, LedError> {
        let buffer = pixel_buffer(buffer, pixel_count, format.channels())?;
        buffer.fill(0);
        Ok(Self {
            buffer,
            pixel_count,
            format,
            led_type: LedType::Ws2812,
            transport,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn slot(&self, index: u16) -> Option<core::ops::Range<usize>> {
        if index >= self.pixel_count {
            return None;
        }
        let bpp = usize::from(self.format.channels());
        let start = usize::from(index) * bpp;
        Some(start..start + bpp)
    }
}

impl<T: LedTransport> LedDriver for Ws2812<'_, T> {
    fn buffer_info(&self) -> BufferInfo {
        BufferInfo {
            pixel_count: self.pixel_count,
            bytes_per_pixel: self.format.channels(),
            color_format: self.format,
            led_type: self.led_type,
        }
    }

    fn buffer(&self) -> &[u8] {
        &*self.buffer
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    fn set_pixel(&mut self, index: u16, color: Color) {
        if let Some(range) = self.slot(index) {
            pack(self.format, color, &mut self.buffer[range]);
        }
    }

    fn pixel(&self, index: u16) -> Option<Color> {
        let range = self.slot(index)?;
        Some(unpack(self.format, &self.buffer[range]))
    }

    fn clear(&mut self) {
        self.buffer.fill(0);
    }

    fn show(&mut self) -> Result<(), LedError> {
        self.transport.transmit(&*self.buffer).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("ws2812: transmit failed");
            LedError::Transport
        })
    }
}
