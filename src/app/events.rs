//! Outbound application events.
//!
//! The sequencer, the accrual subsystem and the
//! [`AppService`](super::service::AppService) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, forward to the
//! home-automation bridge, etc.

use crate::fsm::phase::{Phase, Regime};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller booted (carries the initial phase).
    Started(Phase),

    /// Regime or step changed.
    PhaseChanged { from: Phase, to: Phase },

    /// Step execution is suspended for `secs`.
    DelayArmed { secs: u32 },

    /// A regime request was suppressed by its entry guard.
    RegimeRefused { requested: Regime, current: Regime },

    /// Too many failed cranks; START handed over to STOP.
    StartAbandoned { attempts: u32 },

    /// The running signal crossed the threshold (`true` = now running).
    EngineRunning(bool),

    /// Both accrual counters were written to durable storage.
    CountersPersisted { run_secs: u32, fuel_secs: u32 },

    /// Remaining fuel was set or adjusted by command.
    FuelAdjusted { fuel_secs: u32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub phase: Phase,
    pub retries: u32,
    /// Seconds until the armed delay expires (0 = none).
    pub countdown_secs: u32,
    pub control_switch: bool,
    pub mains_present: bool,
    pub engine_running: bool,
    pub load_connected: bool,
    pub engine_minutes: u32,
    pub fuel_minutes: u32,
    /// Generator active power from the energy meter (W).
    pub active_power_w: f32,
}
