//! LED backend implementations
//!
//! This crate provides concrete implementations of the
//! [`LedDriver`](ltp_core::LedDriver) trait defined in ltp-core:
//!
//! - Single-wire chips (WS2812, SK6812) over an [`LedTransport`](ltp_hal::LedTransport)
//! - Clocked SPI chips (APA102/DotStar, LPD8806) over an
//!   [`embedded_hal::spi::SpiBus`]
//!
//! Every backend stores pixels in the chip's native wire format inside a
//! caller-provided buffer, so `show()` is a straight copy to the bus.

#![no_std]
#![deny(unsafe_code)]

pub mod led;

pub use led::{Apa102, Lpd8806, Ws2812};
