//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                   |
//! |------------|----------------|-------------------------------|
//! | `console`  | (bridge input) | UART / USB-CDC line reader    |
//! | `hardware` | SensorPort     | ESP32 ADC, GPIO, Modbus cache |
//! |            | ActuatorPort   | Relay bank, pulse buttons     |
//! |            | TelemetryPort  | Value channel table           |
//! | `log_sink` | EventSink      | Serial log output             |
//! | `nvs`      | ConfigPort     | NVS / in-memory store         |
//! |            | StoragePort    |                               |
//! | `time`     | ClockPort      | ESP32 system timer            |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
