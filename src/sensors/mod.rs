//! Sensor subsystem: channel port traits and the aggregating [`SensorManager`].
//!
//! The manager owns six channels: four power monitors keyed by [`Rail`] and
//! two climate probes keyed by [`ProbeId`].  Each poll it reads every
//! channel once and writes the results into the sensor field-group of the
//! telemetry snapshot.
//!
//! ## Failure policy
//!
//! A channel failure (init, bus error, timeout, implausible value) only ever
//! clears that channel's `is_available` flag.  The previous numbers stay in
//! place, the other channels are still read, and `poll` itself never fails.
//! Channels that are not initialised are retried on every poll.

mod channel;

use heapless::Vec;
use log::{debug, info, warn};

use crate::app::ports::Clock;
use crate::error::SensorError;
use crate::telemetry::{ChannelId, ProbeId, Rail, SensorReadings};
use channel::Channel;

/// Total number of sensor channels owned by the manager.
pub const CHANNEL_COUNT: usize = Rail::ALL.len() + ProbeId::ALL.len();

// ───────────────────────────────────────────────────────────────
// Channel ports (driven adapters: sensor hardware → manager)
// ───────────────────────────────────────────────────────────────

/// Raw read primitive for one physical sensor.
pub trait Sensor {
    type Reading;

    /// Configure the device.  Called at startup and again before any read
    /// while the device is not initialised.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Take one reading.  Implementations must give up after roughly
    /// `timeout_ms` rather than block.
    fn read(&mut self, timeout_ms: u32) -> Result<Self::Reading, SensorError>;
}

/// Bus voltage / current / power monitor.
pub trait PowerMonitor: Sensor<Reading = PowerReading> {}
impl<T: Sensor<Reading = PowerReading>> PowerMonitor for T {}

/// Temperature / humidity probe.
pub trait ClimateProbe: Sensor<Reading = ClimateReading> {}
impl<T: Sensor<Reading = ClimateReading>> ClimateProbe for T {}

/// One power monitor sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    pub voltage: f32,
    pub current: f32,
    pub power: f32,
}

impl PowerReading {
    /// Reject non-finite values and bus voltages outside the rail's range.
    pub fn check(&self, rail: Rail) -> Result<(), SensorError> {
        if !(self.voltage.is_finite() && self.current.is_finite() && self.power.is_finite()) {
            return Err(SensorError::ReadInvalid("non-finite power reading"));
        }
        if !(0.0..=rail.max_bus_volts()).contains(&self.voltage) {
            return Err(SensorError::ReadInvalid("bus voltage out of range"));
        }
        Ok(())
    }
}

/// One climate probe sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

const PROBE_MIN_C: f32 = -40.0;
const PROBE_MAX_C: f32 = 85.0;

impl ClimateReading {
    pub fn check(&self) -> Result<(), SensorError> {
        if !(PROBE_MIN_C..=PROBE_MAX_C).contains(&self.temperature_c) {
            return Err(SensorError::ReadInvalid("temperature out of range"));
        }
        if !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(SensorError::ReadInvalid("humidity out of range"));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Poll report
// ───────────────────────────────────────────────────────────────

/// Availability transitions observed during one poll.
#[derive(Debug, Default, Clone)]
pub struct PollReport {
    /// Channels that were available last cycle and failed this cycle.
    pub went_offline: Vec<(ChannelId, SensorError), CHANNEL_COUNT>,
    /// Channels that were unavailable last cycle and read fine this cycle.
    pub came_online: Vec<ChannelId, CHANNEL_COUNT>,
}

impl PollReport {
    pub fn is_empty(&self) -> bool {
        self.went_offline.is_empty() && self.came_online.is_empty()
    }

    fn record(&mut self, id: ChannelId, was_available: bool, outcome: Result<(), SensorError>) {
        match outcome {
            Ok(()) if !was_available => {
                info!("{id} online");
                let _ = self.came_online.push(id);
            }
            Err(e) if was_available => {
                warn!("{id} offline: {e}");
                let _ = self.went_offline.push((id, e));
            }
            Err(e) => debug!("{id} still unavailable: {e}"),
            Ok(()) => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SensorManager
// ───────────────────────────────────────────────────────────────

/// Owns every sensor channel and fills the sensor field-group each poll.
pub struct SensorManager<P, C> {
    power: [Channel<P>; 4],
    climate: [Channel<C>; 2],
    read_timeout_ms: u32,
}

impl<P: PowerMonitor, C: ClimateProbe> SensorManager<P, C> {
    /// Build the manager.  `power` is ordered as [`Rail::ALL`]
    /// (3V, 5V, 5V-aux, 24V); `climate` as [`ProbeId::ALL`].
    pub fn new(power: [P; 4], climate: [C; 2], read_timeout_ms: u32) -> Self {
        let [v3, v5, v5_aux, v24] = power;
        let [probe1, probe2] = climate;
        Self {
            power: [
                Channel::new(ChannelId::Power(Rail::V3), v3),
                Channel::new(ChannelId::Power(Rail::V5), v5),
                Channel::new(ChannelId::Power(Rail::V5Aux), v5_aux),
                Channel::new(ChannelId::Power(Rail::V24), v24),
            ],
            climate: [
                Channel::new(ChannelId::Climate(ProbeId::Probe1), probe1),
                Channel::new(ChannelId::Climate(ProbeId::Probe2), probe2),
            ],
            read_timeout_ms,
        }
    }

    /// Configure all six channels.  Failures are logged and returned; the
    /// affected channels stay unavailable and are retried on every poll.
    pub fn init(&mut self) -> Vec<(ChannelId, SensorError), CHANNEL_COUNT> {
        let mut failed = Vec::new();
        let power = self.power.iter_mut().map(|c| (c.id(), c.init()));
        let outcomes: Vec<_, CHANNEL_COUNT> = power
            .chain(self.climate.iter_mut().map(|c| (c.id(), c.init())))
            .collect();
        for (id, result) in outcomes {
            match result {
                Ok(()) => info!("{id} initialised"),
                Err(e) => {
                    warn!("{id} init failed: {e} (will retry every poll)");
                    let _ = failed.push((id, e));
                }
            }
        }
        failed
    }

    /// Read every channel once and update `out`.
    ///
    /// Never fails: per-channel errors land in the availability flags.
    /// Each read is bounded by `read_timeout_ms`, so a full poll takes at
    /// most [`CHANNEL_COUNT`] times that even when every channel is stuck.
    pub fn poll(&mut self, clock: &impl Clock, out: &mut SensorReadings) -> PollReport {
        let mut report = PollReport::default();
        let timeout_ms = self.read_timeout_ms;

        for (rail, channel) in Rail::ALL.into_iter().zip(self.power.iter_mut()) {
            let record = out.rail_mut(rail);
            let was_available = record.is_available;
            let outcome = channel
                .sample(clock, timeout_ms)
                .and_then(|r| r.check(rail).map(|()| r))
                .map(|r| {
                    record.voltage = r.voltage;
                    record.current = r.current;
                    record.power = r.power;
                });
            record.is_available = outcome.is_ok();
            report.record(channel.id(), was_available, outcome);
        }

        for (probe, channel) in ProbeId::ALL.into_iter().zip(self.climate.iter_mut()) {
            let record = out.probe_mut(probe);
            let was_available = record.is_available;
            let outcome = channel
                .sample(clock, timeout_ms)
                .and_then(|r| r.check().map(|()| r))
                .map(|r| {
                    record.temperature = r.temperature_c;
                    record.humidity = r.humidity_pct;
                });
            record.is_available = outcome.is_ok();
            report.record(channel.id(), was_available, outcome);
        }

        report
    }

    /// Whether the channel's device is currently initialised.
    pub fn is_initialised(&self, id: ChannelId) -> bool {
        match id {
            ChannelId::Power(_) => self.power.iter().any(|c| c.id() == id && c.is_ready()),
            ChannelId::Climate(_) => self.climate.iter().any(|c| c.id() == id && c.is_ready()),
        }
    }

    pub fn read_timeout_ms(&self) -> u32 {
        self.read_timeout_ms
    }
}
