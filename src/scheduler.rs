//! Fixed-period cadence for the poll loop.
//!
//! The loop stamps the start of each cycle, runs
//! [`NodeService::tick`](crate::app::service::NodeService::tick), then asks
//! [`PollCadence`] how long to sleep before the next cycle is due.
//!
//! ```text
//!  cycle_start              now          next cycle
//!      │◀──── tick work ────▶│◀── sleep ──▶│
//!      │◀──────────── period_ms ──────────▶│
//! ```
//!
//! A cycle that overruns its period starts the next one immediately; the
//! cadence does not try to catch up missed cycles.

use log::warn;

#[derive(Debug, Clone)]
pub struct PollCadence {
    period_ms: u32,
    overruns: u32,
}

impl PollCadence {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            overruns: 0,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Milliseconds left in the cycle that started at `cycle_start_ms`.
    /// Returns 0 (and logs) when the cycle ran over.
    pub fn remaining_ms(&mut self, cycle_start_ms: u32, now_ms: u32) -> u32 {
        let elapsed = now_ms.wrapping_sub(cycle_start_ms);
        if elapsed > self.period_ms {
            self.overruns = self.overruns.saturating_add(1);
            warn!(
                "poll cycle overran: {} ms > {} ms period ({} overruns)",
                elapsed, self.period_ms, self.overruns
            );
            return 0;
        }
        self.period_ms - elapsed
    }

    /// Cycles that took longer than the period since startup.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}
