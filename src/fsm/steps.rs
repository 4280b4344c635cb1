//! Per-regime step tables.
//!
//! One function per regime, each an exhaustive `match` on that regime's
//! step enum.  A step performs its actuator work and then moves the
//! sequencer with exactly one of `set_step` / `set_regime` (optionally
//! preceded by `arm_delay`).  Terminal steps do nothing.

use log::{info, warn};

use super::phase::{AcFailStep, AcOkStep, Phase, StartStep, StopStep};
use super::{Sequencer, StepIo};
use crate::app::events::AppEvent;

// ── STOP ──────────────────────────────────────────────────────

pub(super) fn run_stop(seq: &mut Sequencer, step: StopStep, io: &mut StepIo<'_>) {
    let config = io.config;
    let map = &config.io;
    match step {
        StopStep::Begin => {
            if io.hw.relay_state(map.relay_load) {
                seq.set_step(Phase::Stop(StopStep::PowerOff), io);
            } else {
                seq.set_step(Phase::Stop(StopStep::EngineOff), io);
            }
        }
        StopStep::PowerOff => {
            info!("STOP: load relay off");
            io.hw.set_relay(map.relay_load, false);
            seq.arm_delay(config.load_shed_settle_secs, io);
            seq.set_step(Phase::Stop(StopStep::EngineOff), io);
        }
        StopStep::EngineOff => {
            info!("STOP: all relays off");
            io.hw.all_relays_off();
            seq.set_step(Phase::Stop(StopStep::End), io);
        }
        StopStep::End => {}
    }
}

// ── START ─────────────────────────────────────────────────────

pub(super) fn run_start(seq: &mut Sequencer, step: StartStep, io: &mut StepIo<'_>) {
    let config = io.config;
    let map = &config.io;
    match step {
        StartStep::Begin => {
            if io.engine_running() {
                info!("START: engine already running, picking up load");
                seq.set_step(Phase::Start(StartStep::PowerOn), io);
            } else {
                seq.set_step(Phase::Start(StartStep::EngineOn), io);
            }
        }
        StartStep::EngineOn => {
            info!("START: fuel and engine relays on");
            io.hw.set_relay(map.relay_fuel, true);
            io.hw.set_relay(map.relay_engine, true);
            seq.arm_delay(config.fuel_prime_secs, io);
            seq.set_step(Phase::Start(StartStep::AirClose), io);
        }
        StartStep::AirClose => {
            if !io.hw.read_binary(map.choke_closed) {
                info!("START: closing choke");
                io.hw.press_button(map.button_air_close);
            }
            seq.set_step(Phase::Start(StartStep::StarterOn), io);
        }
        StartStep::StarterOn => {
            let timeout_ms = u64::from(config.starter_timeout_secs) * 1000;
            seq.set_starter_deadline(io.now_ms + timeout_ms);
            info!("START: cranking (attempt {})", seq.retries() + 1);
            io.hw.set_relay(map.relay_starter, true);
            seq.set_step(Phase::Start(StartStep::StarterWait), io);
        }
        StartStep::StarterWait => {
            if io.now_ms >= seq.starter_deadline_ms() || io.engine_running() {
                seq.set_step(Phase::Start(StartStep::StarterStop), io);
            }
        }
        StartStep::StarterStop => {
            io.hw.set_relay(map.relay_starter, false);
            if io.engine_running() {
                info!("START: engine caught");
                seq.arm_delay(config.choke_open_delay_secs, io);
                seq.set_step(Phase::Start(StartStep::AirOpen), io);
            } else {
                seq.record_failed_crank();
                warn!("START: engine did not catch ({} failed)", seq.retries());
                seq.arm_delay(config.restart_pause_secs, io);
                seq.set_step(Phase::Start(StartStep::WaitRestart), io);
            }
        }
        StartStep::WaitRestart => {
            let attempts = seq.retries();
            // The first crank is not a retry.
            if attempts > config.max_start_retries.saturating_add(1) {
                warn!("START: giving up after {} failed cranks", attempts);
                io.sink.emit(&AppEvent::StartAbandoned { attempts });
                seq.set_regime(Phase::Stop(StopStep::Begin), io);
            } else if attempts.saturating_sub(1) % 2 == 0 {
                // Alternate: crank again with the choke open...
                io.hw.press_button(map.button_air_open);
                seq.set_step(Phase::Start(StartStep::StarterOn), io);
            } else {
                // ...then with it closed.
                seq.set_step(Phase::Start(StartStep::AirClose), io);
            }
        }
        StartStep::AirOpen => {
            info!("START: opening choke");
            io.hw.press_button(map.button_air_open);
            seq.arm_delay(config.load_settle_secs, io);
            seq.set_step(Phase::Start(StartStep::PowerOn), io);
        }
        StartStep::PowerOn => {
            info!("START: load relay on");
            io.hw.set_relay(map.relay_load, true);
            seq.set_step(Phase::Start(StartStep::End), io);
        }
        StartStep::End => {}
    }
}

// ── AC_OK / AC_FAIL ───────────────────────────────────────────

pub(super) fn run_ac_ok(seq: &mut Sequencer, step: AcOkStep, io: &mut StepIo<'_>) {
    match step {
        AcOkStep::Begin => {
            info!("AC_OK: mains back, cooling down");
            seq.arm_delay(io.config.mains_return_cooldown_secs, io);
            seq.set_step(Phase::AcOk(AcOkStep::GenOff), io);
        }
        AcOkStep::GenOff => seq.set_regime(Phase::Stop(StopStep::Begin), io),
    }
}

pub(super) fn run_ac_fail(seq: &mut Sequencer, step: AcFailStep, io: &mut StepIo<'_>) {
    match step {
        AcFailStep::Begin => {
            info!("AC_FAIL: mains lost, confirming outage");
            seq.arm_delay(io.config.mains_loss_confirm_secs, io);
            seq.set_step(Phase::AcFail(AcFailStep::GenOn), io);
        }
        AcFailStep::GenOn => {
            seq.reset_retries();
            seq.set_regime(Phase::Start(StartStep::Begin), io);
        }
    }
}
