//! Polled, debounced push-button driver.
//!
//! ## Hardware
//!
//! Momentary switch on a GPIO input, active-low with pull-up by default.
//! `poll()` is called from the main loop once per cycle; the raw level is
//! fed into a time-based debouncer.
//!
//! ## Debounce state machine
//!
//! | State                  | Raw level | Elapsed since edge | Next state            |
//! |------------------------|-----------|--------------------|-----------------------|
//! | `Released`             | pressed   | –                  | `DebouncingToPressed` |
//! | `DebouncingToPressed`  | released  | –                  | `Released` (bounce)   |
//! | `DebouncingToPressed`  | pressed   | >= debounce        | `Pressed` (accept)    |
//! | `Pressed`              | released  | –                  | `DebouncingToReleased`|
//! | `DebouncingToReleased` | pressed   | –                  | `Pressed` (bounce)    |
//! | `DebouncingToReleased` | released  | >= debounce        | `Released` (accept)   |
//!
//! A bounce drops back to the stable state, so the stable window restarts
//! on the next edge.

use embedded_hal::digital::InputPin;
use log::{debug, info};

/// Internal state machine for the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Released,
    Pressed,
    DebouncingToReleased { since_ms: u32 },
    DebouncingToPressed { since_ms: u32 },
}

/// Pure debouncer: raw samples in, accepted transitions out.
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    stable_ms: u32,
}

impl Debouncer {
    pub fn new(stable_ms: u32) -> Self {
        Self {
            state: DebounceState::Released,
            stable_ms,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Last accepted (debounced) level.
    pub fn is_pressed(&self) -> bool {
        matches!(
            self.state,
            DebounceState::Pressed | DebounceState::DebouncingToReleased { .. }
        )
    }

    /// Feed one raw sample taken at `now_ms`.
    /// Returns the new debounced level when a change is accepted.
    pub fn update(&mut self, raw_pressed: bool, now_ms: u32) -> Option<bool> {
        match self.state {
            DebounceState::Released => {
                if raw_pressed {
                    self.state = DebounceState::DebouncingToPressed { since_ms: now_ms };
                }
                None
            }

            DebounceState::DebouncingToPressed { since_ms } => {
                if !raw_pressed {
                    self.state = DebounceState::Released;
                    None
                } else if now_ms.wrapping_sub(since_ms) >= self.stable_ms {
                    self.state = DebounceState::Pressed;
                    Some(true)
                } else {
                    None
                }
            }

            DebounceState::Pressed => {
                if !raw_pressed {
                    self.state = DebounceState::DebouncingToReleased { since_ms: now_ms };
                }
                None
            }

            DebounceState::DebouncingToReleased { since_ms } => {
                if raw_pressed {
                    self.state = DebounceState::Pressed;
                    None
                } else if now_ms.wrapping_sub(since_ms) >= self.stable_ms {
                    self.state = DebounceState::Released;
                    Some(false)
                } else {
                    None
                }
            }
        }
    }
}

/// Button on a digital input, debounced.
pub struct ButtonMonitor<I> {
    pin: I,
    active_low: bool,
    debouncer: Debouncer,
}

impl<I: InputPin> ButtonMonitor<I> {
    pub fn new(pin: I, active_low: bool, debounce_ms: u32) -> Self {
        Self {
            pin,
            active_low,
            debouncer: Debouncer::new(debounce_ms),
        }
    }

    /// Sample the pin and run the debouncer.  Writes the debounced level
    /// into `out` and returns it if it changed this call.
    ///
    /// A failed pin read counts as "no new sample": the state machine and
    /// `out` are left untouched.
    pub fn poll(&mut self, now_ms: u32, out: &mut bool) -> Option<bool> {
        let level = match self.pin.is_high() {
            Ok(high) => high,
            Err(e) => {
                debug!("button read failed: {:?}", e);
                return None;
            }
        };
        let raw_pressed = level != self.active_low;

        let change = self.debouncer.update(raw_pressed, now_ms);
        if let Some(pressed) = change {
            info!("button {}", if pressed { "pressed" } else { "released" });
        }
        *out = self.debouncer.is_pressed();
        change
    }

    /// Last debounced level.  No side effects.
    pub fn is_pressed(&self) -> bool {
        self.debouncer.is_pressed()
    }

    pub fn state(&self) -> DebounceState {
        self.debouncer.state()
    }
}
