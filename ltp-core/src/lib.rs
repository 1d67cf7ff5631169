//! Board-agnostic core logic for LTP LED devices
//!
//! This crate contains everything between the serial port and the LED
//! buffer that does not depend on a specific chip:
//!
//! - LED backend trait ([`traits::LedDriver`])
//! - Logical-to-physical pixel mapping ([`topology`])
//! - Brightness scaling and the pixel write path ([`controller`])
//! - Packet-level serial link ([`link`])
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod brightness;
pub mod color;
pub mod config;
pub mod controller;
pub mod link;
pub mod topology;
pub mod traits;

pub use brightness::{scale8, Brightness};
pub use color::Color;
pub use config::{DeviceConfig, LinkConfig, TopologyConfig};
pub use controller::LedController;
pub use link::{LinkError, SerialLink};
pub use topology::{Layout, Topology, TopologyError};
pub use traits::{BufferInfo, ColorFormat, LedDriver, LedError, LedType};
