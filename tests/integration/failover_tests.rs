//! Mains loss / return driving the AC_FAIL and AC_OK regimes.

use super::mock_hw::{ActuatorCall, MockGateway, MockStore, Rig};

use genctl::app::events::AppEvent;
use genctl::config::ControllerConfig;
use genctl::fsm::phase::{AcOkStep, Phase, Regime, StartStep, StopStep};
use genctl::pins;

/// Mains present from power-on: the controller settles in STOP/END once the
/// return cooldown has run.
fn rig_on_mains() -> Rig {
    let mut hw = MockGateway::new();
    hw.set_mains(true);
    let mut rig = Rig::with(ControllerConfig::default(), hw, MockStore::default());
    rig.run_for_secs(902);
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));
    rig
}

#[test]
fn mains_loss_starts_generator_after_confirmation() {
    let mut rig = rig_on_mains();

    rig.hw.set_mains(false);
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::AcFail);

    rig.run_for_secs(1_799);
    assert_eq!(rig.app.sequencer().regime(), Regime::AcFail);
    assert!(!rig.hw.any_relay_on());
    assert!(rig.hw.output(pins::VAL_TIMEOUT) <= 1.0);

    rig.run_for_secs(2);
    assert_eq!(rig.app.sequencer().regime(), Regime::Start);
    assert!(rig.hw.relay(pins::RELAY_FUEL));

    rig.run_for_secs(7);
    assert!(rig.hw.relay(pins::RELAY_STARTER));
}

#[test]
fn mains_return_shuts_generator_down_after_cooldown() {
    let mut hw = MockGateway::new();
    hw.set_running(true);
    hw.set_switch(true);
    let mut rig = Rig::with(ControllerConfig::default(), hw, MockStore::default());
    rig.run_for_secs(1);
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::End));

    rig.hw.set_mains(true);
    rig.run_for(100);
    assert_eq!(rig.app.phase(), Phase::AcOk(AcOkStep::GenOff));

    rig.run_for_secs(899);
    assert!(rig.hw.relay(pins::RELAY_LOAD), "cooldown still running");

    rig.run_for_secs(2);
    assert!(!rig.hw.relay(pins::RELAY_LOAD));
    assert!(rig.hw.relay(pins::RELAY_ENGINE));

    rig.run_for_secs(21);
    assert!(!rig.hw.any_relay_on());
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));

    let load_off = rig
        .hw
        .last_position(ActuatorCall::SetRelay { index: pins::RELAY_LOAD, on: false });
    let all_off = rig.hw.last_position(ActuatorCall::AllRelaysOff);
    assert!(load_off < all_off);
}

#[test]
fn mains_return_is_ignored_while_stopping() {
    let mut hw = MockGateway::new();
    hw.set_running(true);
    hw.set_switch(true);
    let mut rig = Rig::with(ControllerConfig::default(), hw, MockStore::default());
    rig.run_for_secs(1);

    // Operator shuts down; the load-shed run-down is in progress.
    rig.hw.set_switch(false);
    rig.run_for(600);
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::EngineOff));

    rig.hw.set_mains(true);
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::Stop);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::RegimeRefused {
                requested: Regime::AcOk,
                current: Regime::Stop
            }
        )),
        1
    );

    rig.run_for_secs(21);
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));
    assert!(!rig.hw.any_relay_on());
}

#[test]
fn mains_loss_is_refused_while_starting() {
    let mut hw = MockGateway::new();
    hw.set_mains(true);
    let mut rig = Rig::with(ControllerConfig::default(), hw, MockStore::default());
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::AcOk);

    rig.hw.set_switch(true);
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::Start);

    rig.hw.set_mains(false);
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::Start);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::RegimeRefused {
                requested: Regime::AcFail,
                current: Regime::Start
            }
        )),
        1
    );

    // The in-flight start keeps going.
    rig.run_for_secs(7);
    assert!(rig.hw.relay(pins::RELAY_STARTER));
}
