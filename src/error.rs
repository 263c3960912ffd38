//! Unified error types for the RailNode firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! binary's top-level error handling uniform.  All variants are `Copy` so they
//! can be passed through the sensor manager and logged without allocation.
//!
//! Sensor errors never escape [`SensorManager::poll`](crate::sensors::SensorManager::poll):
//! they are absorbed into each channel's availability flag.  They only reach
//! callers from `init` (as a per-channel report) and from driver unit tests.

use core::fmt;

use embedded_hal::i2c;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor channel could not be initialised or read.
    Sensor(SensorError),
    /// Configuration failed validation.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Channel bus/device could not be reached or configured at startup.
    Init(&'static str),
    /// The device did not produce a reading within the read timeout.
    ReadTimeout,
    /// The reading failed a checksum, status, or plausibility check.
    ReadInvalid(&'static str),
    /// An I2C transfer failed mid-read.
    Bus(i2c::ErrorKind),
}

impl SensorError {
    /// Whether the device should be re-initialised before the next read.
    pub fn needs_reinit(self) -> bool {
        matches!(self, Self::Init(_) | Self::Bus(_))
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init failed: {msg}"),
            Self::ReadTimeout => write!(f, "read timed out"),
            Self::ReadInvalid(msg) => write!(f, "invalid reading: {msg}"),
            Self::Bus(kind) => write!(f, "I2C error: {kind}"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

/// Map any HAL I2C error onto [`SensorError::Bus`].
pub(crate) fn bus_error<E: i2c::Error>(e: E) -> SensorError {
    SensorError::Bus(e.kind())
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Rejected [`NodeConfig`](crate::config::NodeConfig) values.
/// The `&'static str` names the field and the violated bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ValidationFailed(&'static str),
    /// Serialized config could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed config"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
