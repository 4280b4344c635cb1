//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the sequencer, the accrual subsystem, the control
//! edges and the live configuration.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService         │
//! ActuatorPort ◀──│  edges · pacing · accrual │ ──▶ TelemetryPort
//!                 └──────────────────────────┘
//!                              │
//!                              ▼
//!                        StoragePort
//! ```
//!
//! One [`tick`](AppService::tick) runs, in order: edge detection (control
//! switch, then mains), step pacing with countdown telemetry, accrual
//! (including the fuel-set channel and the power-total shadow), and the
//! periodic telemetry snapshot.  Edges are handled before pacing, so a
//! switch flip always wins over a step that was queued in the old regime.

use log::{debug, info, warn};

use crate::accrual::EngineAccrual;
use crate::config::ControllerConfig;
use crate::fsm::phase::Phase;
use crate::fsm::{Sequencer, StepIo};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigPort, EventSink, GatewayPort, StoragePort};

/// How long a config change may sit unsaved before the auto-save flushes it.
const CONFIG_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: ControllerConfig,
    sequencer: Sequencer,
    accrual: EngineAccrual,
    /// Last observed control-switch level.
    last_control_switch: bool,
    /// Last observed mains-present level.
    last_mains_present: bool,
    /// When the sequencer last executed (or was kicked by an edge).
    last_step_ms: u64,
    /// Value last written to the countdown channel.
    published_countdown: u32,
    last_telemetry_ms: u64,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_ms: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware; call [`boot`](Self::boot) next.
    pub fn new(config: ControllerConfig) -> Self {
        let accrual = EngineAccrual::new(&config);
        Self {
            config,
            sequencer: Sequencer::new(),
            accrual,
            last_control_switch: false,
            last_mains_present: false,
            last_step_ms: 0,
            published_countdown: 0,
            last_telemetry_ms: 0,
            tick_count: 0,
            config_dirty: false,
            dirty_since_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Fail-safe power-on: every relay released, regime/step/countdown
    /// published as zero, accrual counters restored from storage.
    pub fn boot(
        &mut self,
        now_ms: u64,
        hw: &mut impl GatewayPort,
        store: &impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        hw.all_relays_off();
        let io = &self.config.io;
        hw.publish_output(io.out_regime, 0.0);
        hw.publish_output(io.out_step, 0.0);
        hw.publish_output(io.out_timeout, 0.0);
        self.published_countdown = 0;
        self.last_telemetry_ms = now_ms;

        self.accrual.restore(&self.config, hw, store);

        sink.emit(&AppEvent::Started(self.sequencer.phase()));
        info!("AppService started in {:?}", self.sequencer.phase());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies every gateway port at once, which
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl GatewayPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Edge detection
        self.detect_edges(now_ms, hw, sink);

        // 2. Step pacing
        self.pace(now_ms, hw, sink);

        // 3. Accrual
        self.accrual.tick(now_ms, &self.config, hw, store, sink);

        // 4. Periodic telemetry
        let interval_ms = u64::from(self.config.telemetry_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_telemetry_ms) >= interval_ms {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(now_ms, &*hw)));
        }
    }

    fn detect_edges(&mut self, now_ms: u64, hw: &mut impl GatewayPort, sink: &mut impl EventSink) {
        let control = hw.read_binary(self.config.io.control_switch);
        if control != self.last_control_switch {
            self.last_control_switch = control;
            self.sequencer.clear_delay();
            self.last_step_ms = now_ms;
            if control {
                self.with_io(now_ms, hw, sink, |seq, io| seq.start_sequence(io));
            } else {
                self.with_io(now_ms, hw, sink, |seq, io| seq.stop_sequence(io));
            }
        }

        let mains = hw.read_binary(self.config.io.mains_present);
        if mains != self.last_mains_present {
            self.last_mains_present = mains;
            let accepted = if mains {
                self.with_io(now_ms, hw, sink, |seq, io| seq.start_sequence_ac_ok(io))
            } else {
                self.with_io(now_ms, hw, sink, |seq, io| seq.start_sequence_ac_fail(io))
            };
            if accepted {
                self.last_step_ms = now_ms;
            }
        }
    }

    fn pace(&mut self, now_ms: u64, hw: &mut impl GatewayPort, sink: &mut impl EventSink) {
        if !self.sequencer.is_active() {
            return;
        }

        if self.sequencer.delay_pending(now_ms) {
            let remaining = self.sequencer.delay_remaining_secs(now_ms);
            if remaining != self.published_countdown {
                self.published_countdown = remaining;
                debug!("Countdown: {}s", remaining);
                hw.publish_output(self.config.io.out_timeout, remaining as f32);
            }
            return;
        }

        if now_ms.saturating_sub(self.last_step_ms) < u64::from(self.config.step_interval_ms) {
            return;
        }

        self.with_io(now_ms, hw, sink, |seq, io| seq.execute(io));
        self.last_step_ms = now_ms;
        if self.published_countdown != 0 {
            self.published_countdown = 0;
            hw.publish_output(self.config.io.out_timeout, 0.0);
        }
    }

    fn with_io<R>(
        &mut self,
        now_ms: u64,
        hw: &mut dyn GatewayPort,
        sink: &mut dyn EventSink,
        f: impl FnOnce(&mut Sequencer, &mut StepIo<'_>) -> R,
    ) -> R {
        let mut io = StepIo {
            now_ms,
            config: &self.config,
            hw,
            sink,
        };
        f(&mut self.sequencer, &mut io)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl GatewayPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::UpdateConfig(new_config) => {
                self.mark_config_dirty(now_ms);
                self.config = new_config;
                self.accrual.reclamp(&self.config, hw, store, sink);
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.config_dirty = true;
                self.dirty_since_ms = 0;
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
            AppCommand::SaveCounters => {
                self.accrual.persist(now_ms, &self.config, hw, store, sink);
            }
            AppCommand::AdjustFuel(liters) => {
                self.accrual
                    .adjust_fuel(liters, &self.config, hw, store, sink);
            }
            AppCommand::ForcePhase { regime, step } => {
                warn!("Forcing phase {}/{}", regime, step);
                self.sequencer.clear_delay();
                self.with_io(now_ms, hw, sink, |seq, io| {
                    seq.execute_codes(regime, step, io)
                });
                self.last_step_ms = now_ms;
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state and inputs.
    pub fn build_telemetry(&self, now_ms: u64, hw: &impl GatewayPort) -> TelemetryData {
        let io = &self.config.io;
        TelemetryData {
            phase: self.sequencer.phase(),
            retries: self.sequencer.retries(),
            countdown_secs: self.sequencer.delay_remaining_secs(now_ms),
            control_switch: hw.read_binary(io.control_switch),
            mains_present: hw.read_binary(io.mains_present),
            engine_running: hw.read_analog(io.running_signal) > self.config.running_threshold,
            load_connected: hw.relay_state(io.relay_load),
            engine_minutes: self.accrual.engine_minutes(),
            fuel_minutes: self.accrual.fuel_minutes(),
            active_power_w: hw.read_modbus(io.modbus_power),
        }
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn accrual(&self) -> &EngineAccrual {
        &self.accrual
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> ControllerConfig {
        self.config.clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    pub fn mark_config_dirty(&mut self, now_ms: u64) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_ms = now_ms;
        }
    }

    /// Persist the config once it has been dirty for a few seconds.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, now_ms: u64, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        if now_ms.saturating_sub(self.dirty_since_ms) < CONFIG_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved to NVS");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
