//! Pixel color value

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB or RGBW color as sent by the host
///
/// RGB-only backends ignore `w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    /// Parse from 3 (RGB) or 4 (RGBW) wire bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [r, g, b] => Some(Self::rgb(r, g, b)),
            [r, g, b, w] => Some(Self::rgbw(r, g, b, w)),
            _ => None,
        }
    }

    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.w == 0
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, w]: [u8; 4]) -> Self {
        Self::rgbw(r, g, b, w)
    }
}
