//! GPIO / peripheral pin assignments for the RailNode main board.
//!
//! Single source of truth for the board wiring.  Drivers never hard-code pin
//! numbers or bus addresses; the firmware entry point reads them from here.

// ---------------------------------------------------------------------------
// Relay outputs (opto-isolated relay module)
// ---------------------------------------------------------------------------

/// Digital output driving relay channel 1.
pub const RELAY1_GPIO: i32 = 4;
/// Digital output driving relay channel 2.
pub const RELAY2_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button.
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// I²C bus 0: power monitors + climate probe 1
// ---------------------------------------------------------------------------

pub const I2C0_SDA_GPIO: i32 = 14;
pub const I2C0_SCL_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// I²C bus 1: climate probe 2 (AHT20 address is fixed, so it needs its own bus)
// ---------------------------------------------------------------------------

pub const I2C1_SDA_GPIO: i32 = 8;
pub const I2C1_SCL_GPIO: i32 = 9;

/// Both buses run in standard mode.
pub const I2C_BAUD_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// I²C device addresses
// ---------------------------------------------------------------------------

/// INA219 on the 3.3 V rail (A1=GND, A0=GND).
pub const INA219_V3_ADDR: u8 = 0x40;
/// INA219 on the 5 V logic rail (A0=VS).
pub const INA219_V5_ADDR: u8 = 0x41;
/// INA219 on the 5 V auxiliary (Pi) rail (A1=VS).
pub const INA219_V5_AUX_ADDR: u8 = 0x44;
/// INA219 on the 24 V rail (A1=VS, A0=VS).
pub const INA219_V24_ADDR: u8 = 0x45;

/// AHT20 temperature/humidity probe (fixed address, one per bus).
pub const AHT20_ADDR: u8 = 0x38;

/// Shunt resistor fitted to every INA219 breakout (ohms).
pub const INA219_SHUNT_OHMS: f32 = 0.1;
