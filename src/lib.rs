//! RailNode firmware library.
//!
//! Telemetry acquisition and relay control for the RailNode monitoring
//! board: four supply rails (3 V, 5 V, 5 V aux, 24 V), two climate probes,
//! two relays, and one push button.  Everything here is hardware-agnostic
//! and runs on the host; the ESP-IDF wiring lives in the binary.

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod sensors;
pub mod telemetry;
