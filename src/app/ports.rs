//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, relays, telemetry, storage, clock) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the sequencing core never touches hardware.
//!
//! ## Index contract
//!
//! Every indexed call tolerates an index with nothing behind it: reads
//! return `0.0` / `false`, writes are dropped.  A miswired role must never
//! take the control loop down.

use crate::config::ControllerConfig;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: analog, binary and Modbus inputs.
pub trait SensorPort {
    /// Analog value in engineering units, `0.0` if absent.
    fn read_analog(&self, index: usize) -> f32;

    /// Binary input level, `false` if absent.
    fn read_binary(&self, index: usize) -> bool;

    /// Whether a binary input is wired at `index`.
    fn is_binary_present(&self, index: usize) -> bool;

    /// Cached Modbus register, `0.0` if absent.  Informational only.
    fn read_modbus(&self, index: usize) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: relays and momentary buttons.
pub trait ActuatorPort {
    /// Energise (`true`) or release a relay.
    fn set_relay(&mut self, index: usize, on: bool);

    /// Current commanded state of a relay, `false` if absent.
    fn relay_state(&self, index: usize) -> bool;

    /// Number of relays wired.
    fn relay_count(&self) -> usize;

    /// Emit one momentary pulse.  Pulse shaping is the adapter's job.
    fn press_button(&mut self, index: usize);

    /// Release every relay (fail-safe reset).
    fn all_relays_off(&mut self) {
        for index in 0..self.relay_count() {
            self.set_relay(index, false);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (bidirectional value channels)
// ───────────────────────────────────────────────────────────────

/// Published value channels.  Some channels double as inbound commands
/// (fuel-set, total-power override), hence the read side.
pub trait TelemetryPort {
    fn publish_output(&mut self, index: usize, value: f32);

    /// Last value on the channel, `0.0` if absent.
    fn read_output(&self, index: usize) -> f32;
}

/// Everything the controller needs from the I/O gateway in one bound.
pub trait GatewayPort: SensorPort + ActuatorPort + TelemetryPort {}

impl<T: SensorPort + ActuatorPort + TelemetryPort> GatewayPort for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Deadlines are absolute readings of it.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic, with no partial writes on power loss.
/// The ESP-IDF NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Namespace holding the controller's durable counters.
pub const COUNTER_NAMESPACE: &str = "genctl";

/// Durable `u32` counters that survive a restart.
pub trait CounterStore {
    fn persist_counter(&mut self, key: &str, value: u32) -> Result<(), StorageError>;

    /// `Ok(None)` when the key has never been written.
    fn load_counter(&self, key: &str) -> Result<Option<u32>, StorageError>;
}

impl<S: StoragePort + ?Sized> CounterStore for S {
    fn persist_counter(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        self.write(COUNTER_NAMESPACE, key, &value.to_le_bytes())
    }

    fn load_counter(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let mut buf = [0u8; 4];
        match self.read(COUNTER_NAMESPACE, key, &mut buf) {
            Ok(4) => Ok(Some(u32::from_le_bytes(buf))),
            Ok(_) => Err(StorageError::Corrupted),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Stored value has an unexpected size.
    Corrupted,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "value corrupted"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
