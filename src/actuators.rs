//! Relay actuator manager.
//!
//! Owns both relay outputs and mirrors their commanded state into the relay
//! field-group of the telemetry snapshot.  Two ways in:
//!
//! - [`ActuatorManager::set_relay`]: immediate, for upstream commands.
//! - [`ActuatorManager::request`] + [`ActuatorManager::update`]: queue a
//!   state and apply it together with the policy's demand on the next tick.
//!
//! Every `update` re-asserts both outputs, so the physical lines always
//! match the snapshot after a tick.

use embedded_hal::digital::OutputPin;
use log::info;

use crate::app::ports::RelayDemand;
use crate::drivers::relay::RelayDriver;
use crate::telemetry::{RelayId, RelayStates};

pub struct ActuatorManager<O> {
    relay1: RelayDriver<O>,
    relay2: RelayDriver<O>,
    pending: RelayDemand,
}

impl<O: OutputPin> ActuatorManager<O> {
    pub fn new(relay1: RelayDriver<O>, relay2: RelayDriver<O>) -> Self {
        Self {
            relay1,
            relay2,
            pending: RelayDemand::default(),
        }
    }

    /// Drive both relays to the safe default (off).
    pub fn init(&mut self, out: &mut RelayStates) {
        for relay in RelayId::ALL {
            self.driver_mut(relay).set(false);
            out.set(relay, false);
        }
        self.pending = RelayDemand::default();
        info!("relays initialised off");
    }

    /// Command one relay now.  Idempotent: repeating the current state
    /// rewrites the output and leaves the snapshot unchanged.
    /// Returns `true` if the commanded state changed.
    pub fn set_relay(&mut self, relay: RelayId, on: bool, out: &mut RelayStates) -> bool {
        let driver = self.driver_mut(relay);
        let changed = driver.is_on() != on;
        driver.set(on);
        out.set(relay, on);
        if changed {
            info!("{relay} -> {}", if on { "ON" } else { "OFF" });
        }
        changed
    }

    /// Queue a relay state for the next [`update`](Self::update).
    /// A later request for the same relay replaces an earlier one.
    pub fn request(&mut self, relay: RelayId, on: bool) {
        self.pending.set(relay, on);
    }

    /// Apply queued requests and the policy's `demand`, then re-assert every
    /// output.  The policy's demand wins over a queued request for the same
    /// relay.  Returns the relays whose state changed.
    pub fn update(&mut self, demand: RelayDemand, out: &mut RelayStates) -> heapless::Vec<RelayId, 2> {
        let pending = core::mem::take(&mut self.pending);
        let mut changed = heapless::Vec::new();

        for relay in RelayId::ALL {
            let target = demand
                .get(relay)
                .or(pending.get(relay))
                .unwrap_or_else(|| self.driver(relay).is_on());
            if self.set_relay(relay, target, out) {
                let _ = changed.push(relay);
            }
        }
        changed
    }

    /// Commanded state of one relay.
    pub fn is_on(&self, relay: RelayId) -> bool {
        self.driver(relay).is_on()
    }

    /// Borrow a relay driver (used by tests to inspect output levels).
    pub fn driver(&self, relay: RelayId) -> &RelayDriver<O> {
        match relay {
            RelayId::Relay1 => &self.relay1,
            RelayId::Relay2 => &self.relay2,
        }
    }

    fn driver_mut(&mut self, relay: RelayId) -> &mut RelayDriver<O> {
        match relay {
            RelayId::Relay1 => &mut self.relay1,
            RelayId::Relay2 => &mut self.relay2,
        }
    }
}
