//! Regime/step sequencer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Sequencer                                                   │
//! │  phase ─────────▶ steps::run_{stop,start,ac_ok,ac_fail}      │
//! │  delay deadline   (one exhaustive match per regime)          │
//! │  starter deadline                                            │
//! │  retry counter                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller loop asks the sequencer to execute the current step at a
//! fixed cadence, but only once the armed delay has passed.  A step does its
//! actuator work and then moves the phase with [`Sequencer::set_step`] or
//! [`Sequencer::set_regime`].  Nothing here blocks: long waits are expressed
//! as an absolute deadline on the monotonic clock.
//!
//! Issuing a new regime implicitly cancels the pending sequence; the old
//! phase is overwritten and the next [`Sequencer::arm_delay`] supersedes any
//! deadline still armed.

pub mod phase;
pub mod steps;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GatewayPort};
use crate::config::ControllerConfig;
use phase::{Phase, Regime};

/// Everything a step may touch during one execution.
pub struct StepIo<'a> {
    /// Monotonic clock reading for this tick.
    pub now_ms: u64,
    pub config: &'a ControllerConfig,
    pub hw: &'a mut dyn GatewayPort,
    pub sink: &'a mut dyn EventSink,
}

impl StepIo<'_> {
    /// Running signal above threshold.
    pub fn engine_running(&self) -> bool {
        self.hw.read_analog(self.config.io.running_signal) > self.config.running_threshold
    }
}

/// The sequencing state block.  Owned by the controller, mutated only from
/// its tick.
#[derive(Debug, Clone)]
pub struct Sequencer {
    phase: Phase,
    /// Step execution is suppressed while `now < delay_until_ms`.
    delay_until_ms: u64,
    /// End of the current crank attempt.
    starter_deadline_ms: u64,
    retries: u32,
    active: bool,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            delay_until_ms: 0,
            starter_deadline_ms: 0,
            retries: 0,
            active: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn regime(&self) -> Regime {
        self.phase.regime()
    }

    /// Consecutive failed crank attempts in the current START activation.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Whether a sequence has been requested since boot.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Absolute deadline of the armed delay (may lie in the past).
    pub fn delay_deadline_ms(&self) -> u64 {
        self.delay_until_ms
    }

    pub fn delay_pending(&self, now_ms: u64) -> bool {
        now_ms < self.delay_until_ms
    }

    /// Whole seconds left on the armed delay, `0` once it has passed.
    pub fn delay_remaining_secs(&self, now_ms: u64) -> u32 {
        (self.delay_until_ms.saturating_sub(now_ms) / 1000) as u32
    }

    pub(crate) fn starter_deadline_ms(&self) -> u64 {
        self.starter_deadline_ms
    }

    // ── Primitive transitions ─────────────────────────────────

    /// Switch regime and step unconditionally and publish both.  Does not
    /// execute the new step.
    pub fn set_regime(&mut self, to: Phase, io: &mut StepIo<'_>) {
        let from = self.phase;
        self.phase = to;
        info!("Sequencer: {:?} -> {:?}", from, to);
        io.hw
            .publish_output(io.config.io.out_regime, f32::from(to.regime().code()));
        io.hw
            .publish_output(io.config.io.out_step, f32::from(to.step_code()));
        io.sink.emit(&AppEvent::PhaseChanged { from, to });
    }

    /// Move to another step of the current regime and publish it.
    pub fn set_step(&mut self, to: Phase, io: &mut StepIo<'_>) {
        debug_assert_eq!(
            to.regime(),
            self.phase.regime(),
            "set_step must stay within the regime"
        );
        let from = self.phase;
        self.phase = to;
        info!("Sequencer: step {:?} -> {:?}", from, to);
        io.hw
            .publish_output(io.config.io.out_step, f32::from(to.step_code()));
        io.sink.emit(&AppEvent::PhaseChanged { from, to });
    }

    /// Suppress step execution for `secs`.  Overwrites any armed delay.
    pub fn arm_delay(&mut self, secs: u32, io: &mut StepIo<'_>) {
        self.delay_until_ms = io.now_ms + u64::from(secs) * 1000;
        info!("Sequencer: waiting {}s", secs);
        io.sink.emit(&AppEvent::DelayArmed { secs });
    }

    /// Drop any armed delay (used when the operator flips the switch).
    pub fn clear_delay(&mut self) {
        self.delay_until_ms = 0;
    }

    pub(crate) fn set_starter_deadline(&mut self, deadline_ms: u64) {
        self.starter_deadline_ms = deadline_ms;
    }

    pub(crate) fn record_failed_crank(&mut self) {
        self.retries += 1;
    }

    pub(crate) fn reset_retries(&mut self) {
        self.retries = 0;
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Execute the current step.
    pub fn execute(&mut self, io: &mut StepIo<'_>) {
        self.execute_step(self.phase, io);
    }

    /// Run the actions of one (regime, step) pair.
    pub fn execute_step(&mut self, phase: Phase, io: &mut StepIo<'_>) {
        match phase {
            Phase::Idle => {}
            Phase::Stop(step) => steps::run_stop(self, step, io),
            Phase::Start(step) => steps::run_start(self, step, io),
            Phase::AcOk(step) => steps::run_ac_ok(self, step, io),
            Phase::AcFail(step) => steps::run_ac_fail(self, step, io),
        }
    }

    /// Jump to a raw-coded phase and execute it.  Codes outside every step
    /// table force the STOP sequence so the relays always have a way off.
    pub fn execute_codes(&mut self, regime: u8, step: u16, io: &mut StepIo<'_>) {
        match Phase::from_codes(regime, step) {
            Some(phase) => {
                self.active = true;
                self.set_regime(phase, io);
                self.execute_step(phase, io);
            }
            None => {
                warn!(
                    "Sequencer: unknown step {} in regime {}, falling back to STOP",
                    step, regime
                );
                self.active = true;
                self.set_regime(Phase::Stop(phase::StopStep::Begin), io);
            }
        }
    }

    // ── Sequence entry points ─────────────────────────────────

    /// Operator switched the generator on.
    pub fn start_sequence(&mut self, io: &mut StepIo<'_>) {
        info!("Sequencer: generator start requested");
        self.active = true;
        self.set_regime(Phase::begin(Regime::Start), io);
        self.reset_retries();
        self.execute(io);
    }

    /// Operator switched the generator off.
    pub fn stop_sequence(&mut self, io: &mut StepIo<'_>) {
        info!("Sequencer: generator stop requested");
        self.active = true;
        self.set_regime(Phase::begin(Regime::Stop), io);
        self.execute(io);
    }

    /// Mains came back.  Refused while STOP is already in charge.
    pub fn start_sequence_ac_ok(&mut self, io: &mut StepIo<'_>) -> bool {
        self.enter_guarded(Regime::AcOk, Regime::Stop, io)
    }

    /// Mains went away.  Refused while START is already in charge.
    pub fn start_sequence_ac_fail(&mut self, io: &mut StepIo<'_>) -> bool {
        self.enter_guarded(Regime::AcFail, Regime::Start, io)
    }

    fn enter_guarded(&mut self, requested: Regime, blocked_by: Regime, io: &mut StepIo<'_>) -> bool {
        let current = self.regime();
        if current == blocked_by {
            warn!("Sequencer: {:?} refused while {:?} runs", requested, current);
            io.sink.emit(&AppEvent::RegimeRefused { requested, current });
            return false;
        }
        info!("Sequencer: {:?} sequence requested", requested);
        self.active = true;
        self.set_regime(Phase::begin(requested), io);
        self.reset_retries();
        self.execute(io);
        true
    }
}
