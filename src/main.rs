//! RailNode Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  INA219 ×4 ─┐                                                  │
//! │  AHT20  ×1 ─┴─ I2C0 (shared)      Relay ×2   Button            │
//! │  AHT20  ×1 ─── I2C1               (GPIO out) (GPIO in)         │
//! │  MonotonicClock                   LogEventSink                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  SensorManager · ButtonMonitor · ActuatorManager       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PollCadence (fixed-period loop)                               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::info;

use railnode::actuators::ActuatorManager;
use railnode::adapters::log_sink::LogEventSink;
use railnode::adapters::time::MonotonicClock;
use railnode::adapters::timed_i2c::TimedI2c;
use railnode::app::ports::{Clock, HoldRelays};
use railnode::app::service::NodeService;
use railnode::config::NodeConfig;
use railnode::drivers::aht20::Aht20;
use railnode::drivers::button::ButtonMonitor;
use railnode::drivers::ina219::{BusRange, Ina219};
use railnode::drivers::relay::RelayDriver;
use railnode::pins;
use railnode::scheduler::PollCadence;
use railnode::sensors::SensorManager;
use railnode::telemetry::Rail;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RailNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = NodeConfig::default();
    config.validate()?;

    // ── 3. I2C buses ──────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));

    // SAFETY: pin numbers come from `pins`, and each is claimed exactly once.
    let (sda0, scl0, sda1, scl1) = unsafe {
        (
            AnyIOPin::new(pins::I2C0_SDA_GPIO),
            AnyIOPin::new(pins::I2C0_SCL_GPIO),
            AnyIOPin::new(pins::I2C1_SDA_GPIO),
            AnyIOPin::new(pins::I2C1_SCL_GPIO),
        )
    };
    let bus0 = RefCell::new(TimedI2c::new(
        I2cDriver::new(peripherals.i2c0, sda0, scl0, &i2c_config)?,
        config.i2c_timeout(),
    ));
    let bus1 = RefCell::new(TimedI2c::new(
        I2cDriver::new(peripherals.i2c1, sda1, scl1, &i2c_config)?,
        config.i2c_timeout(),
    ));

    // ── 4. Sensors ────────────────────────────────────────────
    let power = Rail::ALL.map(|rail| {
        let address = match rail {
            Rail::V3 => pins::INA219_V3_ADDR,
            Rail::V5 => pins::INA219_V5_ADDR,
            Rail::V5Aux => pins::INA219_V5_AUX_ADDR,
            Rail::V24 => pins::INA219_V24_ADDR,
        };
        Ina219::new(
            RefCellDevice::new(&bus0),
            address,
            BusRange::for_rail(rail),
            pins::INA219_SHUNT_OHMS,
        )
    });
    let climate = [
        Aht20::new(RefCellDevice::new(&bus0), Delay::new_default(), pins::AHT20_ADDR),
        Aht20::new(RefCellDevice::new(&bus1), Delay::new_default(), pins::AHT20_ADDR),
    ];
    let sensors = SensorManager::new(power, climate, config.sensor_read_timeout_ms);

    // ── 5. Relays + button ────────────────────────────────────
    // SAFETY: as above.
    let (relay1_pin, relay2_pin, button_pin) = unsafe {
        (
            AnyOutputPin::new(pins::RELAY1_GPIO),
            AnyOutputPin::new(pins::RELAY2_GPIO),
            AnyIOPin::new(pins::BUTTON_GPIO),
        )
    };
    let actuators = ActuatorManager::new(
        RelayDriver::new(PinDriver::output(relay1_pin)?, config.relay_active_low),
        RelayDriver::new(PinDriver::output(relay2_pin)?, config.relay_active_low),
    );

    let mut button_pin = PinDriver::input(button_pin)?;
    button_pin.set_pull(if config.button_active_low {
        Pull::Up
    } else {
        Pull::Down
    })?;
    let button = ButtonMonitor::new(button_pin, config.button_active_low, config.button_debounce_ms);

    // ── 6. Node service ───────────────────────────────────────
    let mut node = NodeService::new(sensors, actuators, button, MonotonicClock::new());
    let mut sink = LogEventSink::new(config.telemetry_log_every);
    let mut policy = HoldRelays;
    let mut cadence = PollCadence::new(config.poll_interval_ms);

    node.init(&mut sink);
    info!("System ready. Entering poll loop ({} ms).", cadence.period_ms());

    // ── 7. Poll loop ──────────────────────────────────────────
    loop {
        let cycle_start = node.clock().now_ms();
        node.tick(&mut policy, &mut sink);
        let wait = cadence.remaining_ms(cycle_start, node.clock().now_ms());
        // Always yield so the idle task can feed the task watchdog.
        FreeRtos::delay_ms(wait.max(1));
    }
}
