//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements | Connects to                         |
//! |------------|------------|-------------------------------------|
//! | `log_sink` | EventSink  | Serial log output (JSON telemetry)  |
//! | `shared`   | EventSink  | Snapshot handle for other threads   |
//! | `time`     | Clock      | ESP32 system timer / manual clock   |
//! | `timed_i2c`| I2c        | ESP-IDF I²C driver, bounded waits   |

pub mod log_sink;
pub mod shared;
pub mod time;
#[cfg(feature = "espidf")]
pub mod timed_i2c;
