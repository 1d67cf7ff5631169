//! Device configuration types
//!
//! Plain `Copy` structs that describe one installation. They are built at
//! compile time for a given board, or deserialized (with the `serde`
//! feature) by whatever persistence layer the firmware uses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ltp_hal::uart::UartConfig;
use ltp_protocol::{DEFAULT_MAX_PAYLOAD, INTER_BYTE_TIMEOUT_MS, MAX_PAYLOAD_SIZE};

use crate::brightness::Brightness;
use crate::topology::{Layout, Topology, TopologyError};

/// Strips on the octo board
pub const OCTO_STRIP_COUNT: u16 = 8;

/// Pixels per strip on the octo board
pub const OCTO_PIXELS_PER_STRIP: u16 = 120;

/// Physical LED layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopologyConfig {
    /// Number of physical strips
    pub strip_count: u16,
    /// LEDs on each physical strip
    pub pixels_per_strip: u16,
    /// How logical addresses fold onto the strips
    pub layout: Layout,
}

impl TopologyConfig {
    pub const fn new(strip_count: u16, pixels_per_strip: u16, layout: Layout) -> Self {
        Self {
            strip_count,
            pixels_per_strip,
            layout,
        }
    }

    /// Validate into a [`Topology`]
    pub const fn build(&self) -> Result<Topology, TopologyError> {
        Topology::new(self.strip_count, self.pixels_per_strip, self.layout)
    }
}

/// Serial link parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// UART baud rate
    pub baudrate: u32,
    /// Largest payload accepted from the host
    pub max_payload: u16,
    /// Gap after which a partial packet is dropped
    pub inter_byte_timeout_ms: u32,
}

impl LinkConfig {
    pub const DEFAULT: Self = Self {
        baudrate: 115_200,
        max_payload: DEFAULT_MAX_PAYLOAD,
        inter_byte_timeout_ms: INTER_BYTE_TIMEOUT_MS,
    };

    /// UART settings for this link (8N1)
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baudrate,
            ..UartConfig::default()
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything needed to bring up one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    pub topology: TopologyConfig,
    pub link: LinkConfig,
    /// Power-on brightness
    pub brightness: Brightness,
}

impl DeviceConfig {
    /// Octo board: 8 strips of 120 pixels, full-size packets
    pub const fn octo(layout: Layout) -> Self {
        Self {
            topology: TopologyConfig::new(OCTO_STRIP_COUNT, OCTO_PIXELS_PER_STRIP, layout),
            link: LinkConfig {
                max_payload: MAX_PAYLOAD_SIZE as u16,
                ..LinkConfig::DEFAULT
            },
            brightness: Brightness::FULL,
        }
    }
}
