//! Logical-to-physical pixel mapping
//!
//! Physically, every installation is a set of equal-length linear strips
//! laid end to end in one buffer: pixel `p` of strip `s` lives at
//! `s * pixels_per_strip + p`. A [`Topology`] describes how the host's
//! logical address space folds onto that buffer.
//!
//! ```text
//! Strips (3 × 4)      Matrix (4 wide, 3 high)   Serpentine (2 wide, 6 high)
//!
//! s0: 0  1  2  3      row0: 0  1  2  3          strip 0 positions hold
//! s1: 4  5  6  7      row1: 4  5  6  7            logical 0 1 3 2
//! s2: 8  9 10 11      row2: 8  9 10 11          strip 1 positions hold
//!                                                 logical 4 5 7 6
//! ```
//!
//! All mappings are bijections over `[0, logical_pixel_count)`, so a full
//! frame written in logical order touches every physical pixel exactly once.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How logical addresses are laid over the physical strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Layout {
    /// Independent strips addressed by strip id and position
    #[default]
    Strips,
    /// One matrix row per physical strip
    Matrix,
    /// Two matrix rows per physical strip, the second running backwards
    Serpentine,
}

impl Layout {
    /// Matrix rows per physical strip, or `None` for independent strips
    pub const fn fold_factor(self) -> Option<u16> {
        match self {
            Layout::Strips => None,
            Layout::Matrix => Some(1),
            Layout::Serpentine => Some(2),
        }
    }

    /// Inverse of [`fold_factor`](Self::fold_factor)
    pub const fn from_fold_factor(fold: Option<u16>) -> Option<Self> {
        match fold {
            None => Some(Layout::Strips),
            Some(1) => Some(Layout::Matrix),
            Some(2) => Some(Layout::Serpentine),
            Some(_) => None,
        }
    }

    pub const fn is_matrix(self) -> bool {
        !matches!(self, Layout::Strips)
    }
}

/// Invalid topology parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopologyError {
    /// Strip count is zero
    NoStrips,
    /// Pixels per strip is zero
    NoPixels,
    /// Pixels per strip is not divisible by the fold factor
    UnevenFold,
    /// Total pixel count does not fit a 16-bit index
    TooManyPixels,
}

/// Immutable description of the LED installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Topology {
    strip_count: u16,
    pixels_per_strip: u16,
    layout: Layout,
}

impl Topology {
    /// Validate and build a topology
    pub const fn new(
        strip_count: u16,
        pixels_per_strip: u16,
        layout: Layout,
    ) -> Result<Self, TopologyError> {
        if strip_count == 0 {
            return Err(TopologyError::NoStrips);
        }
        if pixels_per_strip == 0 {
            return Err(TopologyError::NoPixels);
        }
        if let Some(fold) = layout.fold_factor() {
            if pixels_per_strip % fold != 0 {
                return Err(TopologyError::UnevenFold);
            }
        }
        if strip_count as u32 * pixels_per_strip as u32 > u16::MAX as u32 {
            return Err(TopologyError::TooManyPixels);
        }
        Ok(Self {
            strip_count,
            pixels_per_strip,
            layout,
        })
    }

    /// Independent strips
    pub const fn strips(strip_count: u16, pixels_per_strip: u16) -> Result<Self, TopologyError> {
        Self::new(strip_count, pixels_per_strip, Layout::Strips)
    }

    /// Matrix with one row per strip
    pub const fn matrix(strip_count: u16, pixels_per_strip: u16) -> Result<Self, TopologyError> {
        Self::new(strip_count, pixels_per_strip, Layout::Matrix)
    }

    /// Matrix with each strip folded into two serpentine rows
    pub const fn serpentine(
        strip_count: u16,
        pixels_per_strip: u16,
    ) -> Result<Self, TopologyError> {
        Self::new(strip_count, pixels_per_strip, Layout::Serpentine)
    }

    pub const fn strip_count(&self) -> u16 {
        self.strip_count
    }

    pub const fn pixels_per_strip(&self) -> u16 {
        self.pixels_per_strip
    }

    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Logical columns
    pub const fn logical_width(&self) -> u16 {
        match self.layout {
            Layout::Strips | Layout::Matrix => self.pixels_per_strip,
            Layout::Serpentine => self.pixels_per_strip / 2,
        }
    }

    /// Logical rows
    pub const fn logical_height(&self) -> u16 {
        match self.layout {
            Layout::Strips | Layout::Matrix => self.strip_count,
            Layout::Serpentine => self.strip_count * 2,
        }
    }

    pub const fn logical_pixel_count(&self) -> u16 {
        self.logical_width() * self.logical_height()
    }

    pub const fn physical_pixel_count(&self) -> u16 {
        self.strip_count * self.pixels_per_strip
    }

    /// Strip count advertised to the host
    ///
    /// A matrix is presented as a single strip covering the whole panel.
    pub const fn reported_strip_count(&self) -> u16 {
        if self.layout.is_matrix() {
            1
        } else {
            self.strip_count
        }
    }

    /// Pixels per strip advertised to the host
    pub const fn reported_pixels_per_strip(&self) -> u16 {
        if self.layout.is_matrix() {
            self.logical_pixel_count()
        } else {
            self.pixels_per_strip
        }
    }

    /// Number of addressable positions on a logical strip
    pub const fn strip_len(&self, strip: u16) -> Option<u16> {
        if self.layout.is_matrix() {
            if strip == 0 {
                Some(self.logical_pixel_count())
            } else {
                None
            }
        } else if strip < self.strip_count {
            Some(self.pixels_per_strip)
        } else {
            None
        }
    }

    /// Physical buffer index of a logical pixel
    ///
    /// Returns `None` for indices outside the logical address space.
    pub const fn map_logical_to_physical(&self, index: u16) -> Option<u16> {
        if index >= self.logical_pixel_count() {
            return None;
        }

        let pps = self.pixels_per_strip;
        match self.layout {
            Layout::Strips => Some(index),
            Layout::Matrix => {
                let row = index / pps;
                let col = index % pps;
                Some(row * pps + col)
            }
            Layout::Serpentine => {
                let width = pps / 2;
                let row = index / width;
                let col = index % width;

                let strip = row / 2;
                let position = if row % 2 == 0 {
                    col
                } else {
                    // Second half runs back towards the strip start
                    pps - 1 - col
                };
                Some(strip * pps + position)
            }
        }
    }

    /// Physical buffer index of a position on a logical strip
    ///
    /// With independent strips this addresses physical strip `strip`. In the
    /// matrix layouts the panel is logical strip 0 and `position` is a
    /// logical pixel index; any other strip id is out of range.
    pub const fn map_strip_pixel(&self, strip: u16, position: u16) -> Option<u16> {
        match self.layout {
            Layout::Strips => {
                if strip < self.strip_count && position < self.pixels_per_strip {
                    Some(strip * self.pixels_per_strip + position)
                } else {
                    None
                }
            }
            Layout::Matrix | Layout::Serpentine => {
                if strip == 0 {
                    self.map_logical_to_physical(position)
                } else {
                    None
                }
            }
        }
    }

    /// Physical buffer index of matrix cell `(x, y)`, top-left origin
    pub const fn map_xy(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.logical_width() || y >= self.logical_height() {
            return None;
        }
        self.map_logical_to_physical(y * self.logical_width() + x)
    }
}
