//! Node service: the fixed-period driver loop.
//!
//! [`NodeService`] owns the telemetry snapshot and the three managers that
//! write into it.  It carries no control policy; it only sequences one poll
//! cycle and emits what happened.
//!
//! ```text
//!  Clock ──▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!            │           NodeService            │
//!            │ stamp → sensors → button → relays │
//! Policy ──▶ └──────────────────────────────────┘
//! ```

use embedded_hal::digital::{InputPin, OutputPin};
use log::info;

use crate::actuators::ActuatorManager;
use crate::drivers::button::ButtonMonitor;
use crate::sensors::{ClimateProbe, PowerMonitor, SensorManager};
use crate::telemetry::{RelayId, TelemetrySnapshot};

use super::events::NodeEvent;
use super::ports::{Clock, EventSink, RelayPolicy};

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService<P, C, O, I, K> {
    snapshot: TelemetrySnapshot,
    sensors: SensorManager<P, C>,
    actuators: ActuatorManager<O>,
    button: ButtonMonitor<I>,
    clock: K,
    cycles: u64,
}

impl<P, C, O, I, K> NodeService<P, C, O, I, K>
where
    P: PowerMonitor,
    C: ClimateProbe,
    O: OutputPin,
    I: InputPin,
    K: Clock,
{
    /// Assemble the service.  Nothing touches hardware until [`init`](Self::init).
    pub fn new(
        sensors: SensorManager<P, C>,
        actuators: ActuatorManager<O>,
        button: ButtonMonitor<I>,
        clock: K,
    ) -> Self {
        Self {
            snapshot: TelemetrySnapshot::new(),
            sensors,
            actuators,
            button,
            clock,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put relays in their safe state and bring up the sensor channels.
    /// Channel init failures are not fatal.
    pub fn init(&mut self, sink: &mut impl EventSink) {
        self.actuators.init(&mut self.snapshot.relays);
        let failed = self.sensors.init();
        info!(
            "node initialised ({} of {} sensor channels up)",
            crate::sensors::CHANNEL_COUNT - failed.len(),
            crate::sensors::CHANNEL_COUNT
        );
        sink.emit(&NodeEvent::Started {
            failed_channels: failed.len(),
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle: stamp → sensors → button → policy → relays.
    pub fn tick(&mut self, policy: &mut impl RelayPolicy, sink: &mut impl EventSink) {
        self.cycles += 1;

        // 1. Timestamp marks the start of the sampling window
        self.snapshot.timestamp = self.clock.now_ms();

        // 2. Sensors
        let report = self.sensors.poll(&self.clock, &mut self.snapshot.sensors);
        for (channel, error) in &report.went_offline {
            sink.emit(&NodeEvent::ChannelOffline {
                channel: *channel,
                error: *error,
            });
        }
        for channel in &report.came_online {
            sink.emit(&NodeEvent::ChannelOnline(*channel));
        }

        // 3. Button (fresh time: sensor reads may have taken a while)
        let now = self.clock.now_ms();
        if let Some(pressed) = self.button.poll(now, &mut self.snapshot.button) {
            sink.emit(&NodeEvent::ButtonChanged { pressed });
        }

        // 4. Relays, with the policy seeing this cycle's data
        let demand = policy.decide(&self.snapshot);
        for relay in self.actuators.update(demand, &mut self.snapshot.relays) {
            sink.emit(&NodeEvent::RelayChanged {
                relay,
                on: self.snapshot.relays.get(relay),
            });
        }

        // 5. Telemetry
        sink.emit(&NodeEvent::Telemetry(self.snapshot));
    }

    // ── Commands ──────────────────────────────────────────────

    /// Command a relay immediately (upstream control entry point).
    pub fn set_relay(&mut self, relay: RelayId, on: bool, sink: &mut impl EventSink) {
        if self.actuators.set_relay(relay, on, &mut self.snapshot.relays) {
            sink.emit(&NodeEvent::RelayChanged { relay, on });
        }
    }

    /// Queue a relay state to be applied on the next tick.
    pub fn request_relay(&mut self, relay: RelayId, on: bool) {
        self.actuators.request(relay, on);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read-only view of the latest snapshot.
    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Poll cycles completed since startup.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn sensors(&self) -> &SensorManager<P, C> {
        &self.sensors
    }

    pub fn actuators(&self) -> &ActuatorManager<O> {
        &self.actuators
    }

    pub fn button(&self) -> &ButtonMonitor<I> {
        &self.button
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}
