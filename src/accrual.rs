//! Engine-hour and fuel-remaining bookkeeping.
//!
//! Driven by the same analog running signal the sequencer uses.  Time is
//! banked in whole seconds per segment: at least every
//! `accrual_segment_secs` while the engine runs, and once more when it
//! stops.  Both counters are written to durable storage on every stop and
//! at most once per `persist_interval_secs` while running.
//!
//! Remaining fuel is a time budget, not a volume: a full tank is
//! `max_tank_secs` of running.  Liters arriving on the fuel-set channel are
//! converted with [`ControllerConfig::secs_per_liter`].
//!
//! The total-power accumulator lives on a telemetry channel owned by the
//! energy meter.  A second "save" channel shadows the last persisted value,
//! so storage is only touched when the two differ.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{CounterStore, EventSink, GatewayPort};
use crate::config::ControllerConfig;

/// Storage key of the accumulated run seconds.
pub const KEY_MOTOHR: &str = "motohr";
/// Storage key of the remaining fuel seconds.
pub const KEY_GAS: &str = "gas";
/// Storage key of the total-power accumulator (raw `f32` bits).
pub const KEY_POWER_TOTAL: &str = "pwrtotal";

#[derive(Debug, Clone)]
pub struct EngineAccrual {
    run_secs: u32,
    fuel_secs: u32,
    engine_on: bool,
    segment_start_ms: u64,
    last_persist_ms: u64,
}

impl EngineAccrual {
    /// Fresh counters: nothing run yet, tank full.
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            run_secs: 0,
            fuel_secs: config.max_tank_secs,
            engine_on: false,
            segment_start_ms: 0,
            last_persist_ms: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn run_secs(&self) -> u32 {
        self.run_secs
    }

    pub fn fuel_secs(&self) -> u32 {
        self.fuel_secs
    }

    pub fn engine_on(&self) -> bool {
        self.engine_on
    }

    pub fn engine_minutes(&self) -> u32 {
        self.run_secs / 60
    }

    pub fn fuel_minutes(&self) -> u32 {
        self.fuel_secs / 60
    }

    // ── Boot ──────────────────────────────────────────────────

    /// Reload counters persisted by a previous run.  Missing keys keep the
    /// fresh defaults; a storage failure is logged and treated the same.
    pub fn restore(
        &mut self,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &impl CounterStore,
    ) {
        match store.load_counter(KEY_MOTOHR) {
            Ok(Some(secs)) => self.run_secs = secs,
            Ok(None) => {}
            Err(e) => warn!("Accrual: cannot read {}: {}", KEY_MOTOHR, e),
        }
        match store.load_counter(KEY_GAS) {
            Ok(Some(secs)) => self.fuel_secs = secs.min(config.max_tank_secs),
            Ok(None) => self.fuel_secs = config.max_tank_secs,
            Err(e) => warn!("Accrual: cannot read {}: {}", KEY_GAS, e),
        }
        match store.load_counter(KEY_POWER_TOTAL) {
            Ok(Some(bits)) => {
                let total = f32::from_bits(bits);
                hw.publish_output(config.io.out_power_total, total);
                hw.publish_output(config.io.out_power_save, total);
            }
            Ok(None) => {}
            Err(e) => warn!("Accrual: cannot read {}: {}", KEY_POWER_TOTAL, e),
        }
        info!(
            "Accrual: restored {} min run, {} min fuel",
            self.engine_minutes(),
            self.fuel_minutes()
        );
        self.publish(config, hw);
    }

    // ── Per-tick ──────────────────────────────────────────────

    /// Sample the running signal and bank elapsed time.
    pub fn tick(
        &mut self,
        now_ms: u64,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
        sink: &mut dyn EventSink,
    ) {
        let running = hw.read_analog(config.io.running_signal) > config.running_threshold;

        match (self.engine_on, running) {
            (false, true) => {
                self.engine_on = true;
                self.segment_start_ms = now_ms;
                self.last_persist_ms = now_ms;
                info!("Accrual: engine running");
                sink.emit(&AppEvent::EngineRunning(true));
                self.publish(config, hw);
            }
            (true, true) => {
                let elapsed = self.elapsed_secs(now_ms);
                if elapsed >= config.accrual_segment_secs {
                    self.bank(elapsed, now_ms);
                    self.publish(config, hw);
                    let since_persist = now_ms.saturating_sub(self.last_persist_ms);
                    if since_persist >= u64::from(config.persist_interval_secs) * 1000 {
                        self.persist(now_ms, config, hw, store, sink);
                    }
                }
            }
            (true, false) => {
                let elapsed = self.elapsed_secs(now_ms);
                self.bank(elapsed, now_ms);
                self.engine_on = false;
                info!("Accrual: engine stopped");
                sink.emit(&AppEvent::EngineRunning(false));
                self.persist(now_ms, config, hw, store, sink);
                self.publish(config, hw);
            }
            (false, false) => {
                // Meter is idle; an override on the total channel is the
                // only thing that can change it.
                self.sync_power_total(config, hw, store);
            }
        }

        self.poll_fuel_command(config, hw, store, sink);
    }

    /// Consume a pending command on the fuel-set channel, if any.
    pub fn poll_fuel_command(
        &mut self,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
        sink: &mut dyn EventSink,
    ) {
        let liters = hw.read_output(config.io.out_fuel_set);
        if liters.abs() <= config.fuel_command_deadband {
            return;
        }
        self.adjust_fuel(liters, config, hw, store, sink);
        hw.publish_output(config.io.out_fuel_set, 0.0);
    }

    /// Positive `liters` sets the remaining fuel outright (refill); negative
    /// `liters` are subtracted as extra consumption.
    pub fn adjust_fuel(
        &mut self,
        liters: f32,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
        sink: &mut dyn EventSink,
    ) {
        let secs = (liters.abs() * config.secs_per_liter()) as u32;
        self.fuel_secs = if liters > 0.0 {
            secs.min(config.max_tank_secs)
        } else {
            self.fuel_secs.saturating_sub(secs).min(config.max_tank_secs)
        };
        info!(
            "Accrual: fuel {} L -> {} min remaining",
            liters,
            self.fuel_minutes()
        );
        sink.emit(&AppEvent::FuelAdjusted {
            fuel_secs: self.fuel_secs,
        });
        self.write_counters(store, sink);
        self.publish(config, hw);
    }

    /// Pull the remaining fuel back under a (possibly smaller) tank size.
    pub fn reclamp(
        &mut self,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
        sink: &mut dyn EventSink,
    ) {
        if self.fuel_secs <= config.max_tank_secs {
            return;
        }
        info!(
            "Accrual: tank shrunk to {} s, fuel {} s clamped",
            config.max_tank_secs, self.fuel_secs
        );
        self.fuel_secs = config.max_tank_secs;
        sink.emit(&AppEvent::FuelAdjusted {
            fuel_secs: self.fuel_secs,
        });
        self.write_counters(store, sink);
        self.publish(config, hw);
    }

    /// Write both counters now (and the power total if it moved).
    pub fn persist(
        &mut self,
        now_ms: u64,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
        sink: &mut dyn EventSink,
    ) {
        if self.write_counters(store, sink) {
            self.last_persist_ms = now_ms;
        }
        self.sync_power_total(config, hw, store);
    }

    // ── Internal ──────────────────────────────────────────────

    fn elapsed_secs(&self, now_ms: u64) -> u32 {
        (now_ms.saturating_sub(self.segment_start_ms) / 1000) as u32
    }

    fn bank(&mut self, secs: u32, now_ms: u64) {
        self.run_secs = self.run_secs.saturating_add(secs);
        self.fuel_secs = self.fuel_secs.saturating_sub(secs);
        self.segment_start_ms = now_ms;
    }

    fn write_counters(&self, store: &mut impl CounterStore, sink: &mut dyn EventSink) -> bool {
        let result = store
            .persist_counter(KEY_MOTOHR, self.run_secs)
            .and_then(|()| store.persist_counter(KEY_GAS, self.fuel_secs));
        match result {
            Ok(()) => {
                info!(
                    "Accrual: counters saved ({} s run, {} s fuel)",
                    self.run_secs, self.fuel_secs
                );
                sink.emit(&AppEvent::CountersPersisted {
                    run_secs: self.run_secs,
                    fuel_secs: self.fuel_secs,
                });
                true
            }
            Err(e) => {
                warn!("Accrual: counter save failed: {}", e);
                false
            }
        }
    }

    fn sync_power_total(
        &self,
        config: &ControllerConfig,
        hw: &mut dyn GatewayPort,
        store: &mut impl CounterStore,
    ) {
        let total = hw.read_output(config.io.out_power_total);
        // Bitwise, so a NaN from the meter still matches its own shadow.
        if total.to_bits() == hw.read_output(config.io.out_power_save).to_bits() {
            return;
        }
        match store.persist_counter(KEY_POWER_TOTAL, total.to_bits()) {
            Ok(()) => hw.publish_output(config.io.out_power_save, total),
            Err(e) => warn!("Accrual: power total save failed: {}", e),
        }
    }

    fn publish(&self, config: &ControllerConfig, hw: &mut dyn GatewayPort) {
        hw.publish_output(config.io.out_motohr, self.engine_minutes() as f32);
        hw.publish_output(config.io.out_gas, self.fuel_minutes() as f32);
    }
}
