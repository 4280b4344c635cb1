//! Engine-hour and fuel bookkeeping across the full service.

use super::mock_hw::{MockGateway, MockStore, Rig};

use genctl::accrual::{KEY_GAS, KEY_MOTOHR, KEY_POWER_TOTAL};
use genctl::app::events::AppEvent;
use genctl::app::commands::AppCommand;
use genctl::app::ports::{CounterStore, TelemetryPort};
use genctl::config::ControllerConfig;
use genctl::pins;

const FULL_TANK: u32 = 30_600;

fn running_rig() -> Rig {
    let mut hw = MockGateway::new();
    hw.set_running(true);
    Rig::with(ControllerConfig::default(), hw, MockStore::default())
}

#[test]
fn ninety_seconds_of_running_are_banked_and_persisted() {
    let mut rig = running_rig();
    rig.run_for_secs(90);
    assert!(rig.app.accrual().engine_on());
    assert_eq!(rig.app.accrual().run_secs(), 60, "one full segment banked");

    rig.hw.set_running(false);
    rig.run_for(100);

    let accrual = rig.app.accrual();
    assert!(!accrual.engine_on());
    assert_eq!(accrual.run_secs(), 90);
    assert_eq!(accrual.fuel_secs(), FULL_TANK - 90);
    assert_eq!(rig.store.counter(KEY_MOTOHR), Some(90));
    assert_eq!(rig.store.counter(KEY_GAS), Some(FULL_TANK - 90));
    assert_eq!(rig.hw.output(pins::VAL_MOTOHR), 1.0);
}

#[test]
fn long_run_persists_at_the_interval_boundary() {
    let mut rig = running_rig();

    rig.run_for_secs(890);
    assert_eq!(rig.store.counter(KEY_MOTOHR), None);

    rig.run_for_secs(60);
    assert!(rig.app.accrual().engine_on());
    assert_eq!(rig.store.counter(KEY_MOTOHR), Some(900));
    assert_eq!(rig.hw.output(pins::VAL_MOTOHR), 15.0);
    assert_eq!(rig.hw.output(pins::VAL_GAS), ((FULL_TANK - 900) / 60) as f32);
}

#[test]
fn counters_survive_a_restart() {
    let mut rig = running_rig();
    rig.run_for_secs(120);
    rig.hw.set_running(false);
    rig.run_for(100);

    let store = std::mem::take(&mut rig.store);
    let rebooted = Rig::with(ControllerConfig::default(), MockGateway::new(), store);
    assert_eq!(rebooted.app.accrual().run_secs(), 120);
    assert_eq!(rebooted.app.accrual().fuel_secs(), FULL_TANK - 120);
    assert_eq!(rebooted.hw.output(pins::VAL_MOTOHR), 2.0);
}

#[test]
fn fuel_set_channel_refills_and_is_acknowledged() {
    let mut store = MockStore::default();
    store.persist_counter(KEY_GAS, 600).unwrap();
    let mut rig = Rig::with(ControllerConfig::default(), MockGateway::new(), store);
    assert_eq!(rig.app.accrual().fuel_secs(), 600);

    // 12.5 L of a 25 L tank.
    rig.hw.publish_output(pins::VAL_FUEL_SET, 12.5);
    rig.run_for(100);

    assert_eq!(rig.app.accrual().fuel_secs(), FULL_TANK / 2);
    assert_eq!(rig.hw.output(pins::VAL_FUEL_SET), 0.0);
    assert_eq!(rig.store.counter(KEY_GAS), Some(FULL_TANK / 2));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::FuelAdjusted { .. })),
        1
    );
}

#[test]
fn fuel_command_inside_deadband_is_left_alone() {
    let mut rig = Rig::new();
    rig.hw.publish_output(pins::VAL_FUEL_SET, 0.3);
    rig.run_for(100);
    assert_eq!(rig.app.accrual().fuel_secs(), FULL_TANK);
    assert_eq!(rig.hw.output(pins::VAL_FUEL_SET), 0.3);
}

#[test]
fn power_total_override_is_saved_while_stopped() {
    let mut rig = Rig::new();
    rig.hw.publish_output(pins::VAL_POWER_TOTAL, 1234.5);
    rig.run_for(100);

    assert_eq!(rig.hw.output(pins::VAL_POWER_SAVE), 1234.5);
    assert_eq!(
        rig.store.counter(KEY_POWER_TOTAL).map(f32::from_bits),
        Some(1234.5)
    );

    let writes = rig.store.writes;
    rig.run_for_secs(5);
    assert_eq!(rig.store.writes, writes, "unchanged total is not rewritten");
}

#[test]
fn failed_persist_keeps_counters_in_memory() {
    let mut rig = running_rig();
    rig.store.fail_writes = true;
    rig.run_for_secs(61);
    rig.hw.set_running(false);
    rig.run_for(100);

    assert_eq!(rig.app.accrual().run_secs(), 61);
    assert_eq!(rig.store.counter(KEY_MOTOHR), None);

    rig.store.fail_writes = false;
    rig.app.handle_command(
        AppCommand::SaveCounters,
        rig.now_ms(),
        &mut rig.hw,
        &mut rig.store,
        &mut rig.sink,
    );
    assert_eq!(rig.store.counter(KEY_MOTOHR), Some(61));
}
