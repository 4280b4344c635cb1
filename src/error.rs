//! Unified error types for the controller firmware.
//!
//! The decision core never fails: every path resolves to a defined regime.
//! Errors only exist at the edges (storage, configuration, boot), and they
//! all funnel into this one enum so `main` and the persistence helpers can
//! use `?` uniformly.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Error {
    /// Durable key/value storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}
