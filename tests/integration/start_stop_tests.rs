//! Operator switch driving the START and STOP choreographies.

use super::mock_hw::{ActuatorCall, MockGateway, MockStore, Rig};

use genctl::app::events::AppEvent;
use genctl::config::ControllerConfig;
use genctl::fsm::phase::{Phase, Regime, StartStep, StopStep};
use genctl::pins;

fn rig_with(running: bool) -> Rig {
    let mut hw = MockGateway::new();
    hw.set_running(running);
    hw.set_switch(true);
    Rig::with(ControllerConfig::default(), hw, MockStore::default())
}

#[test]
fn running_engine_picks_up_load_without_cranking() {
    let mut rig = rig_with(true);

    rig.run_for(100);
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::PowerOn));

    rig.run_for(500);
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::End));
    assert!(rig.hw.relay(pins::RELAY_LOAD));
    assert!(!rig.hw.relay_ever_on(pins::RELAY_STARTER));
    assert_eq!(rig.hw.output(pins::VAL_REGIME), 2.0);
    assert_eq!(rig.hw.output(pins::VAL_STEP), 99.0);
}

#[test]
fn cold_start_primes_closes_choke_then_cranks_until_timeout() {
    let mut rig = rig_with(false);

    rig.run_for(5_400);
    assert!(rig.hw.relay(pins::RELAY_FUEL));
    assert!(rig.hw.relay(pins::RELAY_ENGINE));
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_CLOSE), 0, "fuel still priming");

    rig.run_for(300);
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_CLOSE), 1);
    assert!(!rig.hw.relay(pins::RELAY_STARTER));

    rig.run_for(500);
    assert!(rig.hw.relay(pins::RELAY_STARTER));

    rig.run_for(14_700);
    assert!(rig.hw.relay(pins::RELAY_STARTER), "still inside the crank window");

    rig.run_for(1_000);
    assert!(!rig.hw.relay(pins::RELAY_STARTER));
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::WaitRestart));
    assert_eq!(rig.app.sequencer().retries(), 1);

    let fuel_on = rig.hw.position(ActuatorCall::SetRelay { index: pins::RELAY_FUEL, on: true });
    let choke = rig.hw.position(ActuatorCall::PressButton { index: pins::BUTTON_AIR_CLOSE });
    let crank = rig.hw.position(ActuatorCall::SetRelay { index: pins::RELAY_STARTER, on: true });
    assert!(fuel_on < choke && choke < crank);
}

#[test]
fn crank_stops_as_soon_as_engine_catches() {
    let mut rig = rig_with(false);
    rig.run_for(8_000);
    assert!(rig.hw.relay(pins::RELAY_STARTER));

    rig.hw.set_running(true);
    rig.run_for(1_000);
    assert!(!rig.hw.relay(pins::RELAY_STARTER));
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::AirOpen));

    // 3 s before the choke opens, 30 s of warm-up before the load.
    rig.run_for_secs(4);
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_OPEN), 1);
    assert!(!rig.hw.relay(pins::RELAY_LOAD));

    rig.run_for_secs(31);
    assert!(rig.hw.relay(pins::RELAY_LOAD));
    assert_eq!(rig.app.phase(), Phase::Start(StartStep::End));
    assert_eq!(rig.app.sequencer().retries(), 0);
}

#[test]
fn start_is_abandoned_after_eighth_failed_crank() {
    let mut rig = rig_with(false);

    rig.run_for_secs(400);

    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));
    assert!(!rig.hw.any_relay_on());
    assert_eq!(
        rig.hw.count(ActuatorCall::SetRelay { index: pins::RELAY_STARTER, on: true }),
        8
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::StartAbandoned { attempts: 8 })),
        1
    );
}

#[test]
fn choke_alternates_between_retries() {
    let mut rig = rig_with(false);

    // First failure lands in WAIT_RESTART; the next visit re-cranks with the
    // choke open, the one after re-closes it.
    rig.run_for_secs(40);
    assert_eq!(rig.app.sequencer().retries(), 1);
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_OPEN), 1);
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_CLOSE), 1);

    rig.run_for_secs(32);
    assert_eq!(rig.app.sequencer().retries(), 2);
    assert_eq!(rig.hw.presses(pins::BUTTON_AIR_CLOSE), 2);
}

#[test]
fn switch_off_during_priming_tears_down_without_waiting() {
    let mut rig = rig_with(false);
    rig.run_for(2_000);
    assert!(rig.hw.relay(pins::RELAY_FUEL));

    rig.hw.set_switch(false);
    rig.run_for(100);
    assert_eq!(rig.app.sequencer().regime(), Regime::Stop);

    rig.run_for(600);
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));
    assert!(!rig.hw.any_relay_on());
    assert_eq!(rig.hw.output(pins::VAL_TIMEOUT), 0.0);
}

#[test]
fn switch_off_with_load_on_sheds_load_first() {
    let mut rig = rig_with(true);
    rig.run_for_secs(1);
    assert!(rig.hw.relay(pins::RELAY_LOAD));

    rig.hw.set_switch(false);
    rig.run_for(600);
    assert!(!rig.hw.relay(pins::RELAY_LOAD));
    assert!(rig.hw.relay(pins::RELAY_ENGINE), "engine runs down unloaded");

    rig.run_for_secs(21);
    assert!(!rig.hw.any_relay_on());
    assert_eq!(rig.app.phase(), Phase::Stop(StopStep::End));
}
