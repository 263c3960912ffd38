//! One sensor channel: a device plus its initialisation state and the
//! per-read deadline check.

use crate::app::ports::Clock;
use crate::error::SensorError;
use crate::telemetry::ChannelId;

use super::Sensor;

pub(super) struct Channel<D> {
    id: ChannelId,
    device: D,
    /// Device configured and answering.  Cleared on bus errors so the next
    /// poll re-initialises before reading.
    ready: bool,
}

impl<D: Sensor> Channel<D> {
    pub(super) fn new(id: ChannelId, device: D) -> Self {
        Self {
            id,
            device,
            ready: false,
        }
    }

    pub(super) fn id(&self) -> ChannelId {
        self.id
    }

    pub(super) fn is_ready(&self) -> bool {
        self.ready
    }

    pub(super) fn init(&mut self) -> Result<(), SensorError> {
        let result = self.device.init();
        self.ready = result.is_ok();
        result
    }

    /// Initialise if needed, then take one reading.
    ///
    /// A reading that arrives after `timeout_ms` is discarded as
    /// [`SensorError::ReadTimeout`]: a late sample must not be reported as
    /// belonging to this cycle.
    pub(super) fn sample(
        &mut self,
        clock: &impl Clock,
        timeout_ms: u32,
    ) -> Result<D::Reading, SensorError> {
        if !self.ready {
            self.init()?;
        }

        let started = clock.now_ms();
        let result = self.device.read(timeout_ms);
        let elapsed = clock.now_ms().wrapping_sub(started);

        match result {
            Err(e) => {
                if e.needs_reinit() {
                    self.ready = false;
                }
                Err(e)
            }
            Ok(_) if elapsed > timeout_ms => Err(SensorError::ReadTimeout),
            Ok(reading) => Ok(reading),
        }
    }
}
