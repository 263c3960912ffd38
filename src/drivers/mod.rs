//! Device drivers: I2C sensors, relay outputs, and the button input.

pub mod aht20;
pub mod button;
pub mod ina219;
pub mod relay;
