//! The shared telemetry snapshot.
//!
//! `TelemetrySnapshot` is the single point of truth the rest of the node
//! reads.  It is split into field-groups, one per writer:
//!
//! | Field-group        | Sole writer                                     |
//! |--------------------|-------------------------------------------------|
//! | `timestamp`        | [`NodeService`](crate::app::service::NodeService) |
//! | [`SensorReadings`] | [`SensorManager`](crate::sensors::SensorManager) |
//! | [`RelayStates`]    | [`ActuatorManager`](crate::actuators::ActuatorManager) |
//! | `button`           | [`ButtonMonitor`](crate::drivers::button::ButtonMonitor) |
//!
//! Each component's write operation borrows only its own group mutably, so
//! the ownership partition is checked at compile time.
//!
//! Serialises to the node's JSON telemetry line:
//!
//! ```json
//! {"ts":1234,"voltageSensorV3":{"current":0.12,"voltage":3.29,"power":0.4,"isAvailable":true},
//!  ...,"temperatureSensor1":{"temperature":24.1,"humidity":41.0,"isAvailable":true},
//!  ...,"relay1":false,"relay2":false,"button":false}
//! ```

use core::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Channel identifiers
// ---------------------------------------------------------------------------

/// Nominal supply rail monitored by a power channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rail {
    V3,
    V5,
    /// 5 V auxiliary rail feeding the companion computer.
    V5Aux,
    V24,
}

impl Rail {
    /// Every rail, in poll order.
    pub const ALL: [Rail; 4] = [Rail::V3, Rail::V5, Rail::V5Aux, Rail::V24];

    /// Upper bound of a plausible bus-voltage reading for this rail.
    /// The 24 V channel runs the monitor in its 32 V range; the others in 16 V.
    pub const fn max_bus_volts(self) -> f32 {
        match self {
            Self::V24 => 32.0,
            _ => 16.0,
        }
    }

    /// Whether this rail needs the high-voltage monitor configuration.
    pub const fn is_high_voltage(self) -> bool {
        matches!(self, Self::V24)
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V3 => write!(f, "3V"),
            Self::V5 => write!(f, "5V"),
            Self::V5Aux => write!(f, "5V-aux"),
            Self::V24 => write!(f, "24V"),
        }
    }
}

/// Temperature/humidity probe slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeId {
    Probe1,
    Probe2,
}

impl ProbeId {
    pub const ALL: [ProbeId; 2] = [ProbeId::Probe1, ProbeId::Probe2];
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe1 => write!(f, "temp1"),
            Self::Probe2 => write!(f, "temp2"),
        }
    }
}

/// Any of the six sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Power(Rail),
    Climate(ProbeId),
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(rail) => write!(f, "power[{rail}]"),
            Self::Climate(probe) => write!(f, "climate[{probe}]"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-channel records
// ---------------------------------------------------------------------------

/// One electrical monitoring channel.
///
/// While `is_available` is false the numeric fields hold the last good
/// reading, never garbage.  `power` is whatever the monitor reports and is
/// not required to equal `voltage * current`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoltageSensorData {
    /// Amperes.
    pub current: f32,
    /// Volts.
    pub voltage: f32,
    /// Watts.
    pub power: f32,
    pub is_available: bool,
}

/// One temperature/humidity probe.  Same staleness rule as [`VoltageSensorData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSensorData {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    pub is_available: bool,
}

// ---------------------------------------------------------------------------
// Field-groups
// ---------------------------------------------------------------------------

/// Sensor field-group, written only by the sensor manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorReadings {
    #[serde(rename = "voltageSensorV3")]
    pub v3: VoltageSensorData,
    #[serde(rename = "voltageSensorV5")]
    pub v5: VoltageSensorData,
    #[serde(rename = "voltageSensorV5PiBrain")]
    pub v5_aux: VoltageSensorData,
    #[serde(rename = "voltageSensorV24")]
    pub v24: VoltageSensorData,
    #[serde(rename = "temperatureSensor1")]
    pub temp1: TemperatureSensorData,
    #[serde(rename = "temperatureSensor2")]
    pub temp2: TemperatureSensorData,
}

impl SensorReadings {
    pub fn rail(&self, rail: Rail) -> &VoltageSensorData {
        match rail {
            Rail::V3 => &self.v3,
            Rail::V5 => &self.v5,
            Rail::V5Aux => &self.v5_aux,
            Rail::V24 => &self.v24,
        }
    }

    pub fn rail_mut(&mut self, rail: Rail) -> &mut VoltageSensorData {
        match rail {
            Rail::V3 => &mut self.v3,
            Rail::V5 => &mut self.v5,
            Rail::V5Aux => &mut self.v5_aux,
            Rail::V24 => &mut self.v24,
        }
    }

    pub fn probe(&self, probe: ProbeId) -> &TemperatureSensorData {
        match probe {
            ProbeId::Probe1 => &self.temp1,
            ProbeId::Probe2 => &self.temp2,
        }
    }

    pub fn probe_mut(&mut self, probe: ProbeId) -> &mut TemperatureSensorData {
        match probe {
            ProbeId::Probe1 => &mut self.temp1,
            ProbeId::Probe2 => &mut self.temp2,
        }
    }

    /// Availability flag of any channel.
    pub fn is_available(&self, channel: ChannelId) -> bool {
        match channel {
            ChannelId::Power(rail) => self.rail(rail).is_available,
            ChannelId::Climate(probe) => self.probe(probe).is_available,
        }
    }

    /// Number of channels whose most recent read succeeded.
    pub fn available_count(&self) -> usize {
        let rails = Rail::ALL
            .iter()
            .filter(|r| self.rail(**r).is_available)
            .count();
        let probes = ProbeId::ALL
            .iter()
            .filter(|p| self.probe(**p).is_available)
            .count();
        rails + probes
    }
}

/// Stable logical relay identifier (independent of the GPIO behind it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayId {
    Relay1,
    Relay2,
}

impl RelayId {
    pub const ALL: [RelayId; 2] = [RelayId::Relay1, RelayId::Relay2];
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay1 => write!(f, "relay1"),
            Self::Relay2 => write!(f, "relay2"),
        }
    }
}

/// Relay field-group, written only by the actuator manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStates {
    pub relay1: bool,
    pub relay2: bool,
}

impl RelayStates {
    pub fn get(&self, relay: RelayId) -> bool {
        match relay {
            RelayId::Relay1 => self.relay1,
            RelayId::Relay2 => self.relay2,
        }
    }

    pub fn set(&mut self, relay: RelayId, on: bool) {
        match relay {
            RelayId::Relay1 => self.relay1 = on,
            RelayId::Relay2 => self.relay2 = on,
        }
    }
}

// ---------------------------------------------------------------------------
// TelemetrySnapshot
// ---------------------------------------------------------------------------

/// The node's state as of the most recent poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    /// Monotonic milliseconds at the start of the sampling window.
    #[serde(rename = "ts")]
    pub timestamp: u32,
    #[serde(flatten)]
    pub sensors: SensorReadings,
    #[serde(flatten)]
    pub relays: RelayStates,
    /// Debounced button state.
    pub button: bool,
}

impl TelemetrySnapshot {
    /// Startup state: nothing available, relays off, button released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the snapshot as one JSON telemetry line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
