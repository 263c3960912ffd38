//! Node configuration parameters
//!
//! All tunable timing and wiring-polarity parameters for the RailNode core.
//! Pin numbers and I2C addresses are fixed by the board and live in
//! [`pins`](crate::pins).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::aht20;
use crate::error::ConfigError;
use crate::sensors::CHANNEL_COUNT;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Timing ---
    /// Fixed poll loop period (milliseconds)
    pub poll_interval_ms: u32,
    /// Upper bound on a single sensor channel read (milliseconds)
    pub sensor_read_timeout_ms: u32,
    /// Raw button level must be stable this long before a change is accepted
    pub button_debounce_ms: u32,

    // --- Wiring ---
    /// Button pulls the input LOW when pressed
    pub button_active_low: bool,
    /// Relay module energises on a LOW output
    pub relay_active_low: bool,

    // --- Reporting ---
    /// Emit a telemetry log line every N poll cycles
    pub telemetry_log_every: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Timing
            poll_interval_ms: 1000, // 1 Hz
            sensor_read_timeout_ms: 100,
            button_debounce_ms: 50,

            // Wiring
            button_active_low: true,
            relay_active_low: false,

            // Reporting
            telemetry_log_every: 1,
        }
    }
}

impl NodeConfig {
    /// Reject values that would break the poll loop's timing guarantees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if self.sensor_read_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sensor_read_timeout_ms must be > 0",
            ));
        }
        // Below this no AHT20 can finish a conversion.
        if self.sensor_read_timeout_ms < aht20::MIN_READ_TIMEOUT_MS {
            return Err(ConfigError::ValidationFailed(
                "sensor_read_timeout_ms must cover the AHT20 conversion time",
            ));
        }
        // Every channel timing out must still fit in one period.
        let worst_case = self
            .sensor_read_timeout_ms
            .saturating_mul(CHANNEL_COUNT as u32);
        if worst_case >= self.poll_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "sensor_read_timeout_ms x channels must be < poll_interval_ms",
            ));
        }
        if self.button_debounce_ms == 0 {
            return Err(ConfigError::ValidationFailed("button_debounce_ms must be > 0"));
        }
        if self.telemetry_log_every == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_log_every must be >= 1"));
        }
        Ok(())
    }

    /// Wait allowed for a single I²C transaction.  A stalled bus fails the
    /// first transaction it blocks, which ends that sensor read.
    pub fn i2c_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.sensor_read_timeout_ms))
    }

    /// Parse a JSON override (e.g. from a provisioning file) and validate it.
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}
