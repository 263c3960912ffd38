//! Mock hardware for integration tests.
//!
//! Scripted sensors, an AHT20 bus model, recording relay pins, a
//! controllable button line, and a recording event sink.  Every mock shares one [`ManualClock`] so a test
//! can make a read "take" a given number of milliseconds.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation};

use railnode::actuators::ActuatorManager;
use railnode::adapters::time::ManualClock;
use railnode::app::events::NodeEvent;
use railnode::app::ports::EventSink;
use railnode::app::service::NodeService;
use railnode::config::NodeConfig;
use railnode::drivers::aht20::Aht20;
use railnode::drivers::button::ButtonMonitor;
use railnode::drivers::relay::RelayDriver;
use railnode::error::SensorError;
use railnode::sensors::{ClimateReading, PowerReading, Sensor, SensorManager};
use railnode::telemetry::{ProbeId, Rail};

// ── Scripted sensor ───────────────────────────────────────────

/// One scripted outcome for a `read()` call.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum ReadStep<R> {
    /// Return this reading.
    Value(R),
    /// Fail immediately with this error.
    Fail(SensorError),
    /// Device never answers: burn the whole timeout, then fail.
    Hang,
    /// Return the steady reading, but only after `ms` milliseconds.
    Late(u32),
}

#[derive(Debug)]
pub struct Script<R> {
    /// Returned once the scripted steps run out.
    pub steady: R,
    pub steps: VecDeque<ReadStep<R>>,
    /// Fail this many upcoming `init()` calls.
    pub init_failures: u32,
    /// Clock cost of every read, in ms.
    pub read_cost_ms: u32,
    pub init_calls: u32,
    pub read_calls: u32,
}

/// Test-side handle to a scripted sensor owned by the manager.
#[derive(Debug)]
pub struct ScriptHandle<R>(Rc<RefCell<Script<R>>>);

impl<R> Clone for ScriptHandle<R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

#[allow(dead_code)]
impl<R: Copy> ScriptHandle<R> {
    pub fn push(&self, step: ReadStep<R>) {
        self.0.borrow_mut().steps.push_back(step);
    }

    pub fn set_steady(&self, reading: R) {
        self.0.borrow_mut().steady = reading;
    }

    pub fn fail_inits(&self, n: u32) {
        self.0.borrow_mut().init_failures = n;
    }

    pub fn set_read_cost(&self, ms: u32) {
        self.0.borrow_mut().read_cost_ms = ms;
    }

    pub fn init_calls(&self) -> u32 {
        self.0.borrow().init_calls
    }

    pub fn read_calls(&self) -> u32 {
        self.0.borrow().read_calls
    }
}

pub struct ScriptedSensor<R> {
    script: Rc<RefCell<Script<R>>>,
    clock: Rc<ManualClock>,
}

impl<R: Copy> ScriptedSensor<R> {
    pub fn new(steady: R, clock: Rc<ManualClock>) -> (Self, ScriptHandle<R>) {
        let script = Rc::new(RefCell::new(Script {
            steady,
            steps: VecDeque::new(),
            init_failures: 0,
            read_cost_ms: 0,
            init_calls: 0,
            read_calls: 0,
        }));
        let handle = ScriptHandle(Rc::clone(&script));
        (Self { script, clock }, handle)
    }
}

impl<R: Copy> Sensor for ScriptedSensor<R> {
    type Reading = R;

    fn init(&mut self) -> Result<(), SensorError> {
        let mut s = self.script.borrow_mut();
        s.init_calls += 1;
        if s.init_failures > 0 {
            s.init_failures -= 1;
            return Err(SensorError::Init("no ack"));
        }
        Ok(())
    }

    fn read(&mut self, timeout_ms: u32) -> Result<R, SensorError> {
        let mut s = self.script.borrow_mut();
        s.read_calls += 1;
        self.clock.advance(s.read_cost_ms);
        match s.steps.pop_front() {
            None => Ok(s.steady),
            Some(ReadStep::Value(r)) => Ok(r),
            Some(ReadStep::Fail(e)) => Err(e),
            Some(ReadStep::Hang) => {
                self.clock.advance(timeout_ms);
                Err(SensorError::ReadTimeout)
            }
            Some(ReadStep::Late(ms)) => {
                self.clock.advance(ms);
                Ok(s.steady)
            }
        }
    }
}

pub type PowerSensor = ScriptedSensor<PowerReading>;
pub type ClimateSensor = ScriptedSensor<ClimateReading>;

// ── Nominal readings ──────────────────────────────────────────

pub fn nominal_power(rail: Rail) -> PowerReading {
    let (voltage, current) = match rail {
        Rail::V3 => (3.30, 0.12),
        Rail::V5 => (5.02, 0.45),
        Rail::V5Aux => (5.10, 1.20),
        Rail::V24 => (24.1, 0.80),
    };
    PowerReading {
        voltage,
        current,
        power: voltage * current,
    }
}

pub fn nominal_climate(probe: ProbeId) -> ClimateReading {
    match probe {
        ProbeId::Probe1 => ClimateReading {
            temperature_c: 22.5,
            humidity_pct: 41.0,
        },
        ProbeId::Probe2 => ClimateReading {
            temperature_c: 31.0,
            humidity_pct: 28.5,
        },
    }
}

// ── Sensor rig ────────────────────────────────────────────────

/// Handles to every scripted channel, in `Rail::ALL` / `ProbeId::ALL` order.
pub struct SensorHandles {
    pub power: [ScriptHandle<PowerReading>; 4],
    pub climate: [ScriptHandle<ClimateReading>; 2],
}

#[allow(dead_code)]
impl SensorHandles {
    pub fn rail(&self, rail: Rail) -> &ScriptHandle<PowerReading> {
        let i = Rail::ALL.iter().position(|r| *r == rail).unwrap();
        &self.power[i]
    }

    pub fn probe(&self, probe: ProbeId) -> &ScriptHandle<ClimateReading> {
        let i = ProbeId::ALL.iter().position(|p| *p == probe).unwrap();
        &self.climate[i]
    }
}

pub fn sensor_rig(
    clock: &Rc<ManualClock>,
    read_timeout_ms: u32,
) -> (SensorManager<PowerSensor, ClimateSensor>, SensorHandles) {
    let power = Rail::ALL.map(|rail| ScriptedSensor::new(nominal_power(rail), Rc::clone(clock)));
    let climate =
        ProbeId::ALL.map(|probe| ScriptedSensor::new(nominal_climate(probe), Rc::clone(clock)));

    let [(p0, h0), (p1, h1), (p2, h2), (p3, h3)] = power;
    let [(c0, g0), (c1, g1)] = climate;
    let manager = SensorManager::new([p0, p1, p2, p3], [c0, c1], read_timeout_ms);
    let handles = SensorHandles {
        power: [h0, h1, h2, h3],
        climate: [g0, g1],
    };
    (manager, handles)
}

// ── AHT20 on a simulated bus ──────────────────────────────────

/// Healthy AHT20 that charges `transfer_ms` of clock time per transaction.
/// The measurement frame reads busy while `busy_reads` is non-zero.
#[allow(dead_code)]
pub struct Aht20Bus {
    clock: Rc<ManualClock>,
    transfer_ms: u32,
    busy_reads: Rc<Cell<u32>>,
}

impl i2c::ErrorType for Aht20Bus {
    type Error = i2c::ErrorKind;
}

impl I2c for Aht20Bus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), i2c::ErrorKind> {
        self.clock.advance(self.transfer_ms);
        for op in operations {
            if let Operation::Read(buf) = op {
                // Calibrated, idle, 50 %RH, 25 °C.
                let mut frame = [0x1C, 0x80, 0x00, 0x06, 0x00, 0x00, 0x00];
                frame[6] = aht20_crc(&frame[..6]);
                if buf.len() == frame.len() && self.busy_reads.get() > 0 {
                    self.busy_reads.set(self.busy_reads.get() - 1);
                    frame[0] |= 0x80;
                }
                buf.copy_from_slice(&frame[..buf.len()]);
            }
        }
        Ok(())
    }
}

#[allow(dead_code)]
fn aht20_crc(data: &[u8]) -> u8 {
    data.iter().fold(0xFF, |mut crc, byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
        crc
    })
}

/// Delay that moves the shared clock instead of sleeping.
pub struct ClockDelay(Rc<ManualClock>);

impl DelayNs for ClockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock_ms(ms);
    }
}

#[allow(dead_code)]
impl ClockDelay {
    fn clock_ms(&self, ms: u32) {
        self.0.advance(ms);
    }
}

pub type BusAht20 = Aht20<Aht20Bus, ClockDelay>;

/// Scripted power rails plus two real AHT20 drivers over [`Aht20Bus`].
/// Returns the busy-read counter of each AHT20.
#[allow(dead_code)]
pub fn aht20_rig(
    clock: &Rc<ManualClock>,
    read_timeout_ms: u32,
    transfer_ms: u32,
) -> (SensorManager<PowerSensor, BusAht20>, [Rc<Cell<u32>>; 2]) {
    let power = Rail::ALL.map(|rail| ScriptedSensor::new(nominal_power(rail), Rc::clone(clock)).0);
    let busy = [Rc::new(Cell::new(0)), Rc::new(Cell::new(0))];
    let climate = [0, 1].map(|i| {
        let bus = Aht20Bus {
            clock: Rc::clone(clock),
            transfer_ms,
            busy_reads: Rc::clone(&busy[i]),
        };
        Aht20::new(bus, ClockDelay(Rc::clone(clock)), 0x38)
    });
    (SensorManager::new(power, climate, read_timeout_ms), busy)
}

// ── Relay output pin ──────────────────────────────────────────

/// Output pin that records every level written to it.
#[derive(Debug, Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

#[allow(dead_code)]
impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level; `None` if never written.
    pub fn level(&self) -> Option<bool> {
        self.levels.last().copied()
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}

pub fn actuator_rig(active_low: bool) -> ActuatorManager<RecordingPin> {
    ActuatorManager::new(
        RelayDriver::new(RecordingPin::new(), active_low),
        RelayDriver::new(RecordingPin::new(), active_low),
    )
}

// ── Button line ───────────────────────────────────────────────

/// Test-side control of the button's electrical level.
#[derive(Debug, Clone, Default)]
pub struct ButtonLine {
    high: Rc<Cell<bool>>,
    broken: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl ButtonLine {
    /// Idle line for an active-low button (pulled up).
    pub fn pulled_up() -> Self {
        let line = Self::default();
        line.high.set(true);
        line
    }

    pub fn set_high(&self, high: bool) {
        self.high.set(high);
    }

    /// Make every subsequent pin read fail.
    pub fn set_broken(&self, broken: bool) {
        self.broken.set(broken);
    }

    pub fn pin(&self) -> LinePin {
        LinePin { line: self.clone() }
    }
}

pub struct LinePin {
    line: ButtonLine,
}

impl ErrorType for LinePin {
    type Error = digital::ErrorKind;
}

impl InputPin for LinePin {
    fn is_high(&mut self) -> Result<bool, digital::ErrorKind> {
        if self.line.broken.get() {
            return Err(digital::ErrorKind::Other);
        }
        Ok(self.line.high.get())
    }

    fn is_low(&mut self) -> Result<bool, digital::ErrorKind> {
        self.is_high().map(|high| !high)
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Sink that keeps every emitted event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, NodeEvent::Telemetry(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}

// ── Full node ─────────────────────────────────────────────────

pub type TestNode =
    NodeService<PowerSensor, ClimateSensor, RecordingPin, LinePin, Rc<ManualClock>>;

pub struct Rig {
    pub clock: Rc<ManualClock>,
    pub sensors: SensorHandles,
    pub button: ButtonLine,
}

pub fn node_rig(config: &NodeConfig) -> (TestNode, Rig) {
    let clock = Rc::new(ManualClock::new(1_000));
    let (sensors, handles) = sensor_rig(&clock, config.sensor_read_timeout_ms);
    let actuators = actuator_rig(config.relay_active_low);

    let line = if config.button_active_low {
        ButtonLine::pulled_up()
    } else {
        ButtonLine::default()
    };
    let button = ButtonMonitor::new(line.pin(), config.button_active_low, config.button_debounce_ms);

    let node = NodeService::new(sensors, actuators, button, Rc::clone(&clock));
    let rig = Rig {
        clock,
        sensors: handles,
        button: line,
    };
    (node, rig)
}
