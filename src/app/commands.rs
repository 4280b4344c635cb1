//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (home-automation
//! bridge, serial console, test harness) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::ControllerConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Hot-reload configuration.  Persisted by the auto-save check.
    UpdateConfig(ControllerConfig),

    /// Explicitly persist the current config on the next auto-save check.
    SaveConfig,

    /// Write the accrual counters to storage right now.
    SaveCounters,

    /// Set (positive liters) or reduce (negative liters) remaining fuel.
    AdjustFuel(f32),

    /// Jump to a raw-coded regime/step and execute it (debug / testing
    /// only).  Unknown codes fall back to STOP.
    ForcePhase { regime: u8, step: u16 },
}
