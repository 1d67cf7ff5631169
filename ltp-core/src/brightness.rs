//! Global brightness scaling
//!
//! `scaled = value * (brightness + 1) >> 8`. The `+ 1` keeps full brightness
//! lossless (255 stays 255) while zero brightness still yields zero.

use crate::color::Color;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scale one 8-bit channel by an 8-bit brightness
#[inline]
pub const fn scale8(value: u8, brightness: u8) -> u8 {
    ((value as u16 * (brightness as u16 + 1)) >> 8) as u8
}

/// Global output brightness (0 = dark, 255 = full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Brightness(u8);

impl Default for Brightness {
    fn default() -> Self {
        Self::FULL
    }
}

impl Brightness {
    pub const OFF: Self = Self(0);
    pub const FULL: Self = Self(255);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Scale a single channel value
    pub const fn scale(self, value: u8) -> u8 {
        scale8(value, self.0)
    }

    /// Scale every channel of a color, white included
    pub const fn apply(self, color: Color) -> Color {
        Color {
            r: scale8(color.r, self.0),
            g: scale8(color.g, self.0),
            b: scale8(color.b, self.0),
            w: scale8(color.w, self.0),
        }
    }
}

impl From<u8> for Brightness {
    fn from(level: u8) -> Self {
        Self(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale8_endpoints() {
        assert_eq!(scale8(255, 255), 255);
        assert_eq!(scale8(0, 255), 0);
        assert_eq!(scale8(255, 0), 0);
        assert_eq!(scale8(1, 0), 0);
    }

    #[test]
    fn test_full_brightness_is_identity() {
        for value in 0..=255u8 {
            assert_eq!(scale8(value, 255), value);
        }
    }

    #[test]
    fn test_zero_brightness_is_dark() {
        for value in 0..=255u8 {
            assert_eq!(Brightness::OFF.scale(value), 0);
        }
    }

    #[test]
    fn test_half_brightness() {
        assert_eq!(scale8(255, 127), 127);
        assert_eq!(scale8(200, 127), 100);
    }

    #[test]
    fn test_apply_scales_white() {
        let c = Brightness::new(127).apply(Color::rgbw(255, 128, 0, 64));
        assert_eq!(c, Color::rgbw(127, 64, 0, 32));
    }
}
