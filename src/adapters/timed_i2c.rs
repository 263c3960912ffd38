//! I²C bus with a bounded transaction wait (firmware build only).
//!
//! The `embedded-hal` impl on `esp-idf-hal`'s [`I2cDriver`] waits forever
//! for a transfer to finish, so a device holding SCL low would stall the
//! poll loop.  [`TimedI2c`] passes every transaction a FreeRTOS tick budget
//! taken from [`NodeConfig::i2c_timeout`](crate::config::NodeConfig::i2c_timeout).

use core::time::Duration;

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use esp_idf_hal::delay::TickType;
use esp_idf_hal::i2c::I2cDriver;
use esp_idf_svc::sys::{ESP_FAIL, EspError, TickType_t, esp_err_t};

pub struct TimedI2c<'d> {
    driver: I2cDriver<'d>,
    timeout_ticks: TickType_t,
}

impl<'d> TimedI2c<'d> {
    pub fn new(driver: I2cDriver<'d>, timeout: Duration) -> Self {
        Self {
            driver,
            // Never zero: a zero-tick wait fails every transfer.
            timeout_ticks: TickType::from(timeout).ticks().max(1),
        }
    }
}

#[derive(Debug)]
pub struct TimedI2cError(EspError);

impl i2c::Error for TimedI2cError {
    fn kind(&self) -> ErrorKind {
        // The driver reports an address or data NACK as a plain ESP_FAIL.
        if self.0.code() == ESP_FAIL as esp_err_t {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
        } else {
            ErrorKind::Other
        }
    }
}

impl ErrorType for TimedI2c<'_> {
    type Error = TimedI2cError;
}

impl I2c for TimedI2c<'_> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.driver
            .transaction(address, operations, self.timeout_ticks)
            .map_err(TimedI2cError)
    }
}
