//! LED output backend trait
//!
//! A backend owns the pixel buffer in its chip's native layout. The
//! controller hands it physical indices and already brightness-scaled
//! colors; the backend only converts format (channel order, bit depth) and
//! transmits on [`LedDriver::show`].

pub use ltp_protocol::{ColorFormat, LedType};

use crate::color::Color;

/// Errors reported by LED backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    /// Pixel buffer cannot hold the requested pixel count
    BufferTooSmall,
    /// Transmission to the LEDs failed
    Transport,
}

/// Buffer geometry and color negotiation data for a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferInfo {
    /// Number of physical pixels
    pub pixel_count: u16,
    /// Stride of one pixel in the buffer
    pub bytes_per_pixel: u8,
    /// Color format advertised to the host
    pub color_format: ColorFormat,
    /// Chip family
    pub led_type: LedType,
}

impl BufferInfo {
    /// Bytes of pixel data in the buffer
    pub const fn buffer_len(&self) -> usize {
        self.pixel_count as usize * self.bytes_per_pixel as usize
    }
}

/// Trait for LED strip backends
///
/// Implementations are selected at build time through a type parameter on
/// [`LedController`](crate::controller::LedController), so calls are
/// statically dispatched.
pub trait LedDriver {
    /// Initialize the hardware and blank the LEDs
    fn begin(&mut self) -> Result<(), LedError> {
        self.clear();
        self.show()
    }

    /// Buffer layout and color format
    fn buffer_info(&self) -> BufferInfo;

    /// Number of physical pixels
    fn pixel_count(&self) -> u16 {
        self.buffer_info().pixel_count
    }

    /// Raw pixel buffer in native layout
    fn buffer(&self) -> &[u8];

    /// Mutable raw pixel buffer in native layout
    fn buffer_mut(&mut self) -> &mut [u8];

    /// Store one pixel, converting to native format
    ///
    /// `color` is already brightness-scaled. Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: u16, color: Color);

    /// Read back the stored color of a pixel
    ///
    /// Lossy formats return the closest representable value.
    fn pixel(&self, index: u16) -> Option<Color>;

    /// Set every pixel to black
    fn clear(&mut self);

    /// Transmit the buffer to the LEDs
    ///
    /// The only operation that performs blocking, timing-critical I/O.
    fn show(&mut self) -> Result<(), LedError>;
}
