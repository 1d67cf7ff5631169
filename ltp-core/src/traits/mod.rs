//! Hardware abstraction traits
//!
//! These traits define the interface between the rendering logic
//! and chip-specific LED backends.

pub mod led;

pub use led::{BufferInfo, ColorFormat, LedDriver, LedError, LedType};
