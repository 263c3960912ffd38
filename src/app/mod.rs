//! Application core — poll sequencing, zero I/O.
//!
//! The service sequences one poll cycle over the sensor, button, and relay
//! managers.  Everything outside the crate is reached through the **port
//! traits** in [`ports`], so the whole loop runs on the host against mocks.

pub mod events;
pub mod ports;
pub mod service;
