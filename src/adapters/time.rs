//! Clock adapters.
//!
//! - [`MonotonicClock`]: the system clock.
//!   - **`target_os = "espidf"`** wraps `esp_timer_get_time()` from the
//!     ESP-IDF high-resolution timer (microsecond precision, monotonic).
//!   - **`not(target_os = "espidf")`** uses `std::time::Instant` for
//!     host-side runs.
//! - [`ManualClock`]: set by hand, for tests and simulation.
//!
//! Both report milliseconds since start as a wrapping `u32`.

use core::cell::Cell;

use crate::app::ports::Clock;

/// Monotonic millisecond clock for the ESP32-S3.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since start (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap.
        (self.uptime_us() / 1000) as u32
    }
}

/// Clock that only moves when told to.
///
/// Interior mutability lets a test advance time through a shared
/// reference while the service holds the same clock (e.g. via `Rc`).
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}
