//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A home-automation bridge would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | phase={:?} retries={} wait={}s | switch={} mains={} | \
                     engine={} load={} | run={}min fuel={}min | P={:.0}W",
                    t.phase,
                    t.retries,
                    t.countdown_secs,
                    if t.control_switch { "ON" } else { "OFF" },
                    if t.mains_present { "OK" } else { "LOST" },
                    if t.engine_running { "RUN" } else { "STOP" },
                    if t.load_connected { "ON" } else { "OFF" },
                    t.engine_minutes,
                    t.fuel_minutes,
                    t.active_power_w,
                );
            }
            AppEvent::PhaseChanged { from, to } if from.regime() != to.regime() => {
                info!("REGIME | {:?} -> {:?}", from, to);
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("STEP | {:?} -> {:?}", from, to);
            }
            AppEvent::DelayArmed { secs } => {
                info!("STEP | waiting {}s", secs);
            }
            AppEvent::RegimeRefused { requested, current } => {
                warn!("REGIME | {:?} refused while {:?}", requested, current);
            }
            AppEvent::StartAbandoned { attempts } => {
                warn!("REGIME | start abandoned after {} attempts", attempts);
            }
            AppEvent::EngineRunning(on) => {
                info!("ENGINE | {}", if *on { "running" } else { "stopped" });
            }
            AppEvent::CountersPersisted { run_secs, fuel_secs } => {
                info!("ACCRUAL | saved run={}s fuel={}s", run_secs, fuel_secs);
            }
            AppEvent::FuelAdjusted { fuel_secs } => {
                info!("ACCRUAL | fuel set to {}s", fuel_secs);
            }
            AppEvent::Started(phase) => {
                info!("BOOT | initial_phase={:?}", phase);
            }
        }
    }
}
