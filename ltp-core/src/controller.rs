//! Pixel write path
//!
//! [`LedController`] is what the command layer talks to. Every write goes
//! through the same steps:
//!
//! 1. map the logical address to a physical index via the [`Topology`]
//! 2. scale the color once by the global [`Brightness`]
//! 3. store it in the backend buffer
//!
//! Writes to addresses outside the topology are silently dropped; the real
//! time path never fails on bad coordinates.

use crate::brightness::Brightness;
use crate::color::Color;
use crate::topology::Topology;
use crate::traits::{LedDriver, LedError};

/// Topology-aware, brightness-scaling front end for an LED backend
pub struct LedController<D> {
    driver: D,
    topology: Topology,
    brightness: Brightness,
}

impl<D: LedDriver> LedController<D> {
    /// Create a controller
    ///
    /// Fails if the backend has fewer pixels than the topology addresses.
    pub fn new(driver: D, topology: Topology) -> Result<Self, LedError> {
        if driver.pixel_count() < topology.physical_pixel_count() {
            return Err(LedError::BufferTooSmall);
        }
        Ok(Self {
            driver,
            topology,
            brightness: Brightness::FULL,
        })
    }

    /// Initialize the backend and blank the LEDs
    pub fn begin(&mut self) -> Result<(), LedError> {
        self.driver.begin()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Set global brightness for subsequent writes
    ///
    /// Pixels already in the buffer keep their stored values.
    pub fn set_brightness(&mut self, brightness: impl Into<Brightness>) {
        self.brightness = brightness.into();
    }

    /// Get access to the underlying backend
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get mutable access to the underlying backend
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Release the backend
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Set a pixel by logical index
    pub fn set_pixel(&mut self, index: u16, color: Color) {
        if let Some(physical) = self.topology.map_logical_to_physical(index) {
            let scaled = self.brightness.apply(color);
            self.driver.set_pixel(physical, scaled);
        }
    }

    /// Set a pixel by logical strip and position
    pub fn set_strip_pixel(&mut self, strip: u16, position: u16, color: Color) {
        if let Some(physical) = self.topology.map_strip_pixel(strip, position) {
            let scaled = self.brightness.apply(color);
            self.driver.set_pixel(physical, scaled);
        }
    }

    /// Set a matrix cell, `(0, 0)` at the top left
    pub fn set_xy(&mut self, x: u16, y: u16, color: Color) {
        if let Some(physical) = self.topology.map_xy(x, y) {
            let scaled = self.brightness.apply(color);
            self.driver.set_pixel(physical, scaled);
        }
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: Color) {
        let scaled = self.brightness.apply(color);
        for physical in 0..self.topology.physical_pixel_count() {
            self.driver.set_pixel(physical, scaled);
        }
    }

    /// Set every pixel of one logical strip
    pub fn fill_strip(&mut self, strip: u16, color: Color) {
        if let Some(len) = self.topology.strip_len(strip) {
            self.fill_range(strip, 0, len, color);
        }
    }

    /// Set positions `start..end` of a logical strip
    ///
    /// `end` is exclusive and clamped to the strip length.
    pub fn fill_range(&mut self, strip: u16, start: u16, end: u16, color: Color) {
        let Some(len) = self.topology.strip_len(strip) else {
            return;
        };
        let scaled = self.brightness.apply(color);
        for position in start..end.min(len) {
            if let Some(physical) = self.topology.map_strip_pixel(strip, position) {
                self.driver.set_pixel(physical, scaled);
            }
        }
    }

    /// Stored (post-brightness) color of a logical pixel
    pub fn pixel(&self, index: u16) -> Option<Color> {
        let physical = self.topology.map_logical_to_physical(index)?;
        self.driver.pixel(physical)
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.driver.clear();
    }

    /// Transmit the buffer to the LEDs
    pub fn show(&mut self) -> Result<(), LedError> {
        self.driver.show()
    }
}
