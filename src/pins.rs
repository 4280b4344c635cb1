//! GPIO assignments and logical gateway indices for the controller board.
//!
//! Single source of truth: the default [`IoMap`](crate::config::IoMap) and
//! every driver reference this module rather than hard-coding numbers.
//! Indices address the gateway's indexed collections; GPIO numbers address
//! the ESP32-S3 pads behind them.

// ---------------------------------------------------------------------------
// Relay outputs (8-channel opto-isolated relay board, active HIGH)
// ---------------------------------------------------------------------------

/// Fuel solenoid valve.
pub const RELAY_FUEL: usize = 0;
/// Ignition / engine-run circuit.
pub const RELAY_ENGINE: usize = 1;
/// Starter motor contactor.
pub const RELAY_STARTER: usize = 2;
/// Choke actuator, drive towards open.
pub const RELAY_AIR_TO_OFF: usize = 3;
/// Choke actuator, drive towards closed.
pub const RELAY_AIR_TO_ON: usize = 4;
/// Load contactor (generator output to the house bus).
pub const RELAY_LOAD: usize = 5;

/// GPIO pads for the relay bank, in relay-index order.
pub const RELAY_GPIOS: [i32; 6] = [38, 39, 40, 41, 42, 21];

// ---------------------------------------------------------------------------
// Momentary button outputs (pulse into the choke controller)
// ---------------------------------------------------------------------------

pub const BUTTON_AIR_CLOSE: usize = 0;
pub const BUTTON_AIR_OPEN: usize = 1;

pub const BUTTON_GPIOS: [i32; 2] = [47, 48];

/// Width of a single emulated button press.
pub const BUTTON_PULSE_MS: u64 = 300;

// ---------------------------------------------------------------------------
// Analog inputs (ADC1)
// ---------------------------------------------------------------------------

pub const ADC_AI1: usize = 0;
pub const ADC_AI2: usize = 1;
/// Alternator output sense. Above the running threshold = engine running.
pub const ADC_AI3: usize = 2;
pub const ADC_AI4: usize = 3;

/// ADC1 channels for AI1..AI4 (GPIO 4..7 on ESP32-S3).
pub const ADC1_CHANNELS: [u32; 4] = [3, 4, 5, 6];

/// Full-scale raw ADC count (12-bit).
pub const ADC_FULL_SCALE: u16 = 4095;
/// Engineering units at full scale for every analog input.
pub const ADC_SCALE_UNITS: f32 = 100.0;

// ---------------------------------------------------------------------------
// Binary inputs (opto-isolated, active HIGH)
// ---------------------------------------------------------------------------

pub const IN1: usize = 0;
pub const IN2: usize = 1;
pub const IN3: usize = 2;
pub const IN4: usize = 3;
/// Choke end-stop: HIGH when the choke is already closed.
pub const IN5: usize = 4;
pub const IN6: usize = 5;
/// Mains voltage detector. HIGH = utility power present.
pub const IN_AC_CTRL: usize = 6;
/// Virtual input carrying the user's generator on/off switch.
pub const IN_CONTROL_SWITCH: usize = 7;

/// GPIO pads for IN1..IN6 and the mains detector. The control switch has no
/// pad; it is written by the home-automation bridge.
pub const BINARY_GPIOS: [i32; 7] = [8, 9, 10, 11, 12, 13, 14];

// ---------------------------------------------------------------------------
// Modbus registers (energy meter on RS-485, informational only)
// ---------------------------------------------------------------------------

pub const MODBUS_ACTIVE_POWER: usize = 0;
pub const MODBUS_VOLTAGE: usize = 1;
pub const MODBUS_FREQUENCY: usize = 2;

// ---------------------------------------------------------------------------
// Telemetry output channels
// ---------------------------------------------------------------------------

pub const VAL_REGIME: usize = 0;
pub const VAL_STEP: usize = 1;
/// Seconds until the armed delay expires.
pub const VAL_TIMEOUT: usize = 2;
/// Accumulated engine run time, minutes.
pub const VAL_MOTOHR: usize = 3;
/// Remaining fuel, minutes of running.
pub const VAL_GAS: usize = 4;
/// Inbound fuel command, liters (positive = absolute, negative = consumed).
pub const VAL_FUEL_SET: usize = 5;
/// Total energy accumulator (owned by the home-automation side).
pub const VAL_POWER_TOTAL: usize = 6;
/// Last persisted value of [`VAL_POWER_TOTAL`].
pub const VAL_POWER_SAVE: usize = 7;

pub const TELEMETRY_CHANNELS: usize = 8;
