//! Monotonic time source
//!
//! Millisecond timestamps are `u32` and wrap after ~49 days. Consumers must
//! compare them with `wrapping_sub`.

/// Monotonic millisecond clock
pub trait Monotonic {
    /// Current time in milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Clock backed by `embassy_time::Instant`
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl Monotonic for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is intended: callers use wrapping arithmetic
        embassy_time::Instant::now().as_millis() as u32
    }
}
