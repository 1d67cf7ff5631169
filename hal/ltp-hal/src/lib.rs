//! LTP Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the LED link core
//! needs from a board: a non-blocking serial port, a monotonic millisecond
//! clock and a raw LED data transport. Chip-specific crates implement these
//! so the same framing and rendering code runs on any microcontroller.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ltp-core (link, controller, mapping)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ltp-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-io   │       │ board PIO/RMT │
//! │ serial ports  │       │ LED outputs   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`time::Monotonic`] - Millisecond clock for inter-byte timeouts
//! - [`led::LedTransport`] - Timing-critical LED data output

#![no_std]
#![deny(unsafe_code)]

pub mod led;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use led::LedTransport;
pub use time::Monotonic;
pub use uart::{EmbeddedIoUart, UartRx, UartTx};
