//! APA102 / DotStar SPI LED backend
//!
//! Wire format per pixel is `[0xE0 | level, B, G, R]` where `level` is a
//! 5-bit per-pixel current setting. A frame is a 32-bit zero start frame,
//! the pixels, then at least `n / 2` clock edges of ones to push data down
//! the chain.
//!
//! Global brightness has already been applied to the color by the time it
//! reaches this driver; the per-pixel level is left at full unless changed
//! with [`Apa102::set_pixel_brightness`].

use embedded_hal::spi::SpiBus;
use ltp_core::{BufferInfo, Color, ColorFormat, LedDriver, LedError, LedType};

use super::pixel_buffer;

const BYTES_PER_PIXEL: u8 = 4;
const START_FRAME: [u8; 4] = [0x00; 4];
const END_FRAME_CHUNK: [u8; 16] = [0xFF; 16];

/// Header bits marking a pixel frame
const PIXEL_MARKER: u8 = 0xE0;
/// Maximum per-pixel current level
pub const MAX_LEVEL: u8 = 0x1F;

/// APA102 strip driver
pub struct Apa102<'a, S> {
    buffer: &'a mut [u8],
    pixel_count: u16,
    led_type: LedType,
    spi: S,
}

impl<'a, S: SpiBus> Apa102<'a, S> {
    pub fn new(buffer: &'a mut [u8], pixel_count: u16, spi: S) -> Result<Self, LedError> {
        let buffer = pixel_buffer(buffer, pixel_count, BYTES_PER_PIXEL)?;
        for pixel in buffer.chunks_exact_mut(usize::from(BYTES_PER_PIXEL)) {
            pixel.copy_from_slice(&[PIXEL_MARKER | MAX_LEVEL, 0, 0, 0]);
        }
        Ok(Self {
            buffer,
            pixel_count,
            led_type: LedType::Apa102,
            spi,
        })
    }

    /// Same chip, reported to the host as DotStar
    pub fn dotstar(buffer: &'a mut [u8], pixel_count: u16, spi: S) -> Result<Self, LedError> {
        let mut strip = Self::new(buffer, pixel_count, spi)?;
        strip.led_type = LedType::DotStar;
        Ok(strip)
    }

    /// Set the 5-bit current level of one pixel (0-31, higher bits ignored)
    pub fn set_pixel_brightness(&mut self, index: u16, level: u8) {
        if let Some(offset) = self.offset(index) {
            self.buffer[offset] = PIXEL_MARKER | (level & MAX_LEVEL);
        }
    }

    pub fn spi(&self) -> &S {
        &self.spi
    }

    pub fn spi_mut(&mut self) -> &mut S {
        &mut self.spi
    }

    /// Bytes of ones needed to clock the last pixel through
    fn end_frame_len(&self) -> usize {
        usize::from(self.pixel_count) / 16 + 1
    }

    fn offset(&self, index: u16) -> Option<usize> {
        (index < self.pixel_count).then(|| usize::from(index) * usize::from(BYTES_PER_PIXEL))
    }

    fn write_frame(&mut self) -> Result<(), S::Error> {
        self.spi.write(&START_FRAME)?;
        self.spi.write(&*self.buffer)?;

        let mut remaining = self.end_frame_len();
        while remaining > 0 {
            let n = remaining.min(END_FRAME_CHUNK.len());
            self.spi.write(&END_FRAME_CHUNK[..n])?;
            remaining -= n;
        }
        self.spi.flush()
    }
}

impl<S: SpiBus> LedDriver for Apa102<'_, S> {
    fn buffer_info(&self) -> BufferInfo {
        BufferInfo {
            pixel_count: self.pixel_count,
            bytes_per_pixel: BYTES_PER_PIXEL,
            color_format: ColorFormat::Rgb,
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
        if let Some(offset) = self.offset(index) {
            self.buffer[offset + 1..offset + 4].copy_from_slice(&[color.b, color.g, color.r]);
        }
    }

    fn pixel(&self, index: u16) -> Option<Color> {
        let offset = self.offset(index)?;
        let bgr = &self.buffer[offset + 1..offset + 4];
        Some(Color::rgb(bgr[2], bgr[1], bgr[0]))
    }

    /// Black out every pixel, keeping per-pixel levels
    fn clear(&mut self) {
        for pixel in self.buffer.chunks_exact_mut(usize::from(BYTES_PER_PIXEL)) {
            pixel[1..].fill(0);
        }
    }

    fn show(&mut self) -> Result<(), LedError> {
        self.write_frame().map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("apa102: SPI write failed");
            LedError::Transport
        })
    }
}
