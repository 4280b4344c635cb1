//! Monotonic clock adapters.
//!
//! - [`MonotonicClock`]: on **`target_os = "espidf"`** wraps
//!   `esp_timer_get_time()` (microsecond precision, monotonic since boot);
//!   elsewhere uses `std::time::Instant` for host-side simulation.
//! - [`SimClock`]: manually advanced, for tests and accelerated replays of
//!   multi-minute sequences.

use core::cell::Cell;

use crate::app::ports::ClockPort;

/// Milliseconds since boot.
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
}

impl ClockPort for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: Cell<u64>,
}

impl SimClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs * 1000);
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_ms.set(ms);
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
