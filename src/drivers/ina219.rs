//! INA219 high-side bus voltage / current / power monitor (I²C).
//!
//! All four rail channels use the same part; only the bus range differs.
//! The 24 V rail runs in the 32 V range, the rest in the 16 V range.  The
//! PGA is fixed at /8 (±320 mV shunt), which with a 0.1 Ω shunt gives a
//! ±3.2 A measurement span.
//!
//! ## Registers (16-bit, big-endian)
//!
//! | Addr | Name        | Use                                         |
//! |------|-------------|---------------------------------------------|
//! | 0x00 | Config      | range, gain, ADC resolution, mode           |
//! | 0x02 | Bus voltage | bits 15..3 × 4 mV; bit 0 = math overflow     |
//! | 0x03 | Power       | × power LSB (20 × current LSB)              |
//! | 0x04 | Current     | signed, × current LSB                       |
//! | 0x05 | Calibration | reads back 0 after a device reset/brown-out |

use embedded_hal::i2c::I2c;

use crate::error::{SensorError, bus_error};
use crate::sensors::{PowerReading, Sensor};
use crate::telemetry::Rail;

const REG_CONFIG: u8 = 0x00;
const REG_BUS_VOLTAGE: u8 = 0x02;
const REG_POWER: u8 = 0x03;
const REG_CURRENT: u8 = 0x04;
const REG_CALIBRATION: u8 = 0x05;

const CONFIG_RESET: u16 = 0x8000;
const CONFIG_BRNG_32V: u16 = 0x2000;
/// PGA /8, ±320 mV.
const CONFIG_GAIN_320MV: u16 = 0x1800;
/// 12-bit bus ADC, 12-bit single-sample shunt ADC.
const CONFIG_ADC_12BIT: u16 = 0x0180 | 0x0018;
/// Shunt and bus, continuous.
const CONFIG_MODE_CONTINUOUS: u16 = 0x0007;

const BUS_VOLTAGE_LSB_V: f32 = 0.004;
const BUS_OVERFLOW: u16 = 0x0001;

/// Current resolution: 0.1 mA per bit.
const CURRENT_LSB_A: f32 = 0.000_1;
const POWER_LSB_W: f32 = CURRENT_LSB_A * 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusRange {
    /// 0–16 V full scale.
    V16,
    /// 0–32 V full scale (high-voltage rails).
    V32,
}

impl BusRange {
    /// Range the monitor on `rail` is configured for.
    pub const fn for_rail(rail: Rail) -> Self {
        if rail.is_high_voltage() {
            Self::V32
        } else {
            Self::V16
        }
    }
}

pub struct Ina219<I2C> {
    i2c: I2C,
    address: u8,
    range: BusRange,
    calibration: u16,
}

impl<I2C: I2c> Ina219<I2C> {
    pub fn new(i2c: I2C, address: u8, range: BusRange, shunt_ohms: f32) -> Self {
        Self {
            i2c,
            address,
            range,
            calibration: calibration_for(shunt_ohms),
        }
    }

    fn config_word(&self) -> u16 {
        let brng = match self.range {
            BusRange::V16 => 0,
            BusRange::V32 => CONFIG_BRNG_32V,
        };
        brng | CONFIG_GAIN_320MV | CONFIG_ADC_12BIT | CONFIG_MODE_CONTINUOUS
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), I2C::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[reg, hi, lo])
    }
}

/// `Cal = trunc(0.04096 / (current_lsb * R_shunt))` from the datasheet.
fn calibration_for(shunt_ohms: f32) -> u16 {
    (0.04096 / (CURRENT_LSB_A * shunt_ohms)).round() as u16
}

impl<I2C: I2c> Sensor for Ina219<I2C> {
    type Reading = PowerReading;

    fn init(&mut self) -> Result<(), SensorError> {
        let config = self.config_word();
        let calibration = self.calibration;
        self.write_register(REG_CONFIG, CONFIG_RESET)
            .and_then(|()| self.write_register(REG_CONFIG, config))
            .and_then(|()| self.write_register(REG_CALIBRATION, calibration))
            .map_err(|_| SensorError::Init("INA219 not responding"))?;

        let readback = self
            .read_register(REG_CONFIG)
            .map_err(|_| SensorError::Init("INA219 not responding"))?;
        if readback != config {
            return Err(SensorError::Init("INA219 config readback mismatch"));
        }
        Ok(())
    }

    /// The INA219 converts continuously, so a read is four register
    /// transfers and never waits on the device.  The bus itself bounds each
    /// transfer (see `adapters::timed_i2c`); a read that answers but runs
    /// past `_timeout_ms` is rejected by the sensor channel.
    fn read(&mut self, _timeout_ms: u32) -> Result<PowerReading, SensorError> {
        let bus = self.read_register(REG_BUS_VOLTAGE).map_err(bus_error)?;
        if bus & BUS_OVERFLOW != 0 {
            return Err(SensorError::ReadInvalid("INA219 math overflow"));
        }

        // A reset wipes the calibration register; current and power read
        // zero until it is rewritten.
        let calibration = self.read_register(REG_CALIBRATION).map_err(bus_error)?;
        if calibration == 0 {
            return Err(SensorError::Init("INA219 calibration lost"));
        }

        let current_raw = self.read_register(REG_CURRENT).map_err(bus_error)? as i16;
        let power_raw = self.read_register(REG_POWER).map_err(bus_error)?;

        Ok(PowerReading {
            voltage: f32::from(bus >> 3) * BUS_VOLTAGE_LSB_V,
            current: f32::from(current_raw) * CURRENT_LSB_A,
            power: f32::from(power_raw) * POWER_LSB_W,
        })
    }
}
