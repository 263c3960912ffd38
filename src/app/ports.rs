//! Port traits: the boundary between the node core and the outside world.
//!
//! ```text
//!   Clock ──▶ NodeService ──▶ EventSink
//!                  ▲
//!             RelayPolicy
//! ```
//!
//! Sensor read primitives are ports too; they live next to their consumer in
//! [`sensors`](crate::sensors).  Relay outputs and the button input use the
//! `embedded-hal` digital traits directly.

use crate::telemetry::{RelayId, TelemetrySnapshot};

use super::events::NodeEvent;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → core)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; consumers use
/// `wrapping_sub` for elapsed time.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

impl<T: Clock + ?Sized> Clock for std::rc::Rc<T> {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / reporting)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`NodeEvent`]s through this port.  Adapters
/// decide where they go (serial log, shared snapshot for another task, ...).
pub trait EventSink {
    fn emit(&mut self, event: &NodeEvent);
}

/// Fan one event out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &NodeEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Relay policy (driving adapter: control policy → actuators)
// ───────────────────────────────────────────────────────────────

/// Relay states a policy wants applied this cycle.  `None` leaves the relay
/// as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayDemand {
    pub relay1: Option<bool>,
    pub relay2: Option<bool>,
}

impl RelayDemand {
    /// Demand a single relay state.
    pub fn only(relay: RelayId, on: bool) -> Self {
        let mut demand = Self::default();
        demand.set(relay, on);
        demand
    }

    pub fn get(&self, relay: RelayId) -> Option<bool> {
        match relay {
            RelayId::Relay1 => self.relay1,
            RelayId::Relay2 => self.relay2,
        }
    }

    pub fn set(&mut self, relay: RelayId, on: bool) {
        match relay {
            RelayId::Relay1 => self.relay1 = Some(on),
            RelayId::Relay2 => self.relay2 = Some(on),
        }
    }
}

/// Decides desired relay state from the current cycle's snapshot.
///
/// Called once per tick after sensors and button have been polled, so a
/// policy always sees the same cycle's data.
pub trait RelayPolicy {
    fn decide(&mut self, snapshot: &TelemetrySnapshot) -> RelayDemand;
}

/// Any closure over the snapshot is a policy.
impl<F: FnMut(&TelemetrySnapshot) -> RelayDemand> RelayPolicy for F {
    fn decide(&mut self, snapshot: &TelemetrySnapshot) -> RelayDemand {
        self(snapshot)
    }
}

/// Policy that never asks for a change; relays only move on explicit
/// commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldRelays;

impl RelayPolicy for HoldRelays {
    fn decide(&mut self, _snapshot: &TelemetrySnapshot) -> RelayDemand {
        RelayDemand::default()
    }
}
