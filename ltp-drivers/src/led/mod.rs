//! LED strip backends
//!
//! - [`Ws2812`]: WS2812/SK6812 style chips, 3 or 4 bytes per pixel
//! - [`Apa102`]: APA102/DotStar, BGR with a 5-bit per-pixel brightness
//! - [`Lpd8806`]: LPD8806, 7-bit GRB with the high bit set

pub mod apa102;
pub mod lpd8806;
pub mod ws2812;

pub use apa102::Apa102;
pub use lpd8806::Lpd8806;
pub use ws2812::Ws2812;

use ltp_core::{Color, ColorFormat, LedError};

/// Bytes of `buffer` needed for `pixel_count` pixels
fn required_len(
    buffer: &[u8],
    pixel_count: u16,
    bytes_per_pixel: u8,
) -> Result<usize, LedError> {
    let len = usize::from(pixel_count) * usize::from(bytes_per_pixel);
    if buffer.len() < len {
        #[cfg(feature = "defmt")]
        defmt::error!(
            "led: buffer of {} bytes too small for {} pixels",
            buffer.len(),
            pixel_count
        );
        return Err(LedError::BufferTooSmall);
    }
    Ok(len)
}

/// Trim a caller buffer to exactly `pixel_count` pixels
pub(crate) fn pixel_buffer(
    buffer: &mut [u8],
    pixel_count: u16,
    bytes_per_pixel: u8,
) -> Result<&mut [u8], LedError> {
    let len = required_len(buffer, pixel_count, bytes_per_pixel)?;
    Ok(&mut buffer[..len])
}

/// Write `color` into one pixel slot in channel order `format`
pub(crate) fn pack(format: ColorFormat, color: Color, slot: &mut [u8]) {
    match format {
        ColorFormat::Rgb => slot[..3].copy_from_slice(&[color.r, color.g, color.b]),
        ColorFormat::Grb => slot[..3].copy_from_slice(&[color.g, color.r, color.b]),
        ColorFormat::Rgbw => slot[..4].copy_from_slice(&[color.r, color.g, color.b, color.w]),
        ColorFormat::Grbw => slot[..4].copy_from_slice(&[color.g, color.r, color.b, color.w]),
    }
}

/// Inverse of [`pack`]
pub(crate) fn unpack(format: ColorFormat, slot: &[u8]) -> Color {
    match format {
        ColorFormat::Rgb => Color::rgb(slot[0], slot[1], slot[2]),
        ColorFormat::Grb => Color::rgb(slot[1], slot[0], slot[2]),
        ColorFormat::Rgbw => Color::rgbw(slot[0], slot[1], slot[2], slot[3]),
        ColorFormat::Grbw => Color::rgbw(slot[1], slot[0], slot[2], slot[3]),
    }
}
