//! AHT20 temperature / relative-humidity probe (I²C, fixed address 0x38).
//!
//! Measurement is triggered by command and takes ~80 ms.  The driver waits
//! out the conversion, then polls the busy bit in 10 ms steps until the
//! caller's timeout is spent, keeping [`TRANSFER_MARGIN_MS`] of it back for
//! the bus transfers themselves.  Frames are CRC-8 checked
//! (poly 0x31, init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{SensorError, bus_error};
use crate::sensors::{ClimateReading, Sensor};

const CMD_INIT: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_MEASURE: [u8; 3] = [0xAC, 0x33, 0x00];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const INIT_SETTLE_MS: u32 = 10;
const BUSY_POLL_MS: u32 = 10;

/// Conversion time after a measure command.
pub const MEASURE_MS: u32 = 80;
/// Part of a read budget reserved for the command and frame transfers.
pub const TRANSFER_MARGIN_MS: u32 = 10;
/// Shortest read timeout that can ever produce a reading.
pub const MIN_READ_TIMEOUT_MS: u32 = MEASURE_MS + TRANSFER_MARGIN_MS;

/// 2^20: full scale of the 20-bit humidity and temperature fields.
const FULL_SCALE: f32 = 1_048_576.0;

pub struct Aht20<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Aht20<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    fn status(&mut self) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.read(self.address, &mut buf)?;
        Ok(buf[0])
    }
}

impl<I2C: I2c, D: DelayNs> Sensor for Aht20<I2C, D> {
    type Reading = ClimateReading;

    fn init(&mut self) -> Result<(), SensorError> {
        let status = self
            .status()
            .map_err(|_| SensorError::Init("AHT20 not responding"))?;
        if status & STATUS_CALIBRATED != 0 {
            return Ok(());
        }

        self.i2c
            .write(self.address, &CMD_INIT)
            .map_err(|_| SensorError::Init("AHT20 not responding"))?;
        self.delay.delay_ms(INIT_SETTLE_MS);

        let status = self
            .status()
            .map_err(|_| SensorError::Init("AHT20 not responding"))?;
        if status & STATUS_CALIBRATED == 0 {
            return Err(SensorError::Init("AHT20 calibration bit not set"));
        }
        Ok(())
    }

    fn read(&mut self, timeout_ms: u32) -> Result<ClimateReading, SensorError> {
        if timeout_ms < MIN_READ_TIMEOUT_MS {
            return Err(SensorError::ReadTimeout);
        }
        let budget = timeout_ms - TRANSFER_MARGIN_MS;

        self.i2c
            .write(self.address, &CMD_MEASURE)
            .map_err(bus_error)?;
        self.delay.delay_ms(MEASURE_MS);
        let mut waited = MEASURE_MS;

        let mut frame = [0u8; 7];
        loop {
            self.i2c.read(self.address, &mut frame).map_err(bus_error)?;
            if frame[0] & STATUS_BUSY == 0 {
                break;
            }
            if waited + BUSY_POLL_MS > budget {
                return Err(SensorError::ReadTimeout);
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited += BUSY_POLL_MS;
        }

        if crc8(&frame[..6]) != frame[6] {
            return Err(SensorError::ReadInvalid("AHT20 CRC mismatch"));
        }
        Ok(decode(&frame))
    }
}

fn decode(frame: &[u8; 7]) -> ClimateReading {
    let humidity_raw =
        (u32::from(frame[1]) << 12) | (u32::from(frame[2]) << 4) | (u32::from(frame[3]) >> 4);
    let temperature_raw =
        (u32::from(frame[3] & 0x0F) << 16) | (u32::from(frame[4]) << 8) | u32::from(frame[5]);
    ClimateReading {
        temperature_c: temperature_raw as f32 * 200.0 / FULL_SCALE - 50.0,
        humidity_pct: humidity_raw as f32 * 100.0 / FULL_SCALE,
    }
}

fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0xFF, |mut crc, byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
        crc
    })
}
