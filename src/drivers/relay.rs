//! Relay output driver (opto-isolated relay module).
//!
//! Drives one relay coil through a digital output.  Polarity is a wiring
//! property: most hobby relay boards energise on a LOW input.
//!
//! `set()` always writes the pin, even when the commanded state is
//! unchanged, so a line disturbed from outside is pulled back to the
//! commanded level on the next call.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

pub struct RelayDriver<O> {
    pin: O,
    active_low: bool,
    on: bool,
}

impl<O: OutputPin> RelayDriver<O> {
    /// Wrap a pin.  The relay is not driven until the first `set()`.
    pub fn new(pin: O, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            on: false,
        }
    }

    /// Command the relay and write the output level.
    ///
    /// Output writes are treated as infallible at this layer: a HAL error
    /// is logged and the commanded state is still recorded.
    pub fn set(&mut self, on: bool) {
        self.on = on;
        let level = PinState::from(on != self.active_low);
        if let Err(e) = self.pin.set_state(level) {
            warn!("relay output write failed: {:?}", e);
        }
    }

    /// Commanded state (true = energised).
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Borrow the pin (used by tests to inspect the output level).
    pub fn pin(&self) -> &O {
        &self.pin
    }
}
