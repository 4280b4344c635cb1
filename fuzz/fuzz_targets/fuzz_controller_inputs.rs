//! Fuzz target: `AppService` driven by arbitrary input sequences
//!
//! Each input byte is one operation against the host-simulated board
//! (switch, mains, running signal, fuel command, clock jump).  After every
//! operation the target checks:
//! - No panics
//! - Remaining fuel stays within [0, full tank]
//! - The retry counter never passes the abandon threshold
//! - STOP/END always means every relay is released
//!
//! cargo fuzz run fuzz_controller_inputs

#![no_main]

use libfuzzer_sys::fuzz_target;

use genctl::adapters::hardware::HardwareAdapter;
use genctl::adapters::log_sink::LogEventSink;
use genctl::adapters::nvs::NvsAdapter;
use genctl::app::commands::AppCommand;
use genctl::app::ports::{ActuatorPort, TelemetryPort};
use genctl::app::service::AppService;
use genctl::config::ControllerConfig;
use genctl::fsm::phase::{Phase, StopStep};
use genctl::pins;

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new() else {
        return;
    };
    let config = ControllerConfig::default();
    let mut hw = HardwareAdapter::from_pins();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    let mut now_ms: u64 = 0;

    hw.tick(now_ms);
    app.boot(now_ms, &mut hw, &nvs, &mut sink);

    for &byte in data {
        let arg = byte & 0x1F;
        match byte >> 5 {
            0 => hw.sensors_mut().set_control_switch(arg & 1 == 1),
            1 => hw.sensors_mut().sim_set_binary(pins::IN_AC_CTRL, arg & 1 == 1),
            2 => hw.sensors_mut().sim_set_analog(pins::ADC_AI3, f32::from(arg) * 3.0),
            3 => hw.sensors_mut().sim_set_binary(pins::IN5, arg & 1 == 1),
            4 => hw.publish_output(pins::VAL_FUEL_SET, f32::from(arg) - 16.0),
            5 => app.handle_command(
                AppCommand::AdjustFuel(f32::from(arg) * 2.0 - 31.0),
                now_ms,
                &mut hw,
                &mut nvs,
                &mut sink,
            ),
            // Clock jumps from 100 ms up to ~17 minutes.
            _ => {
                let jump_ticks = 1u64 << (arg % 14);
                for _ in 0..jump_ticks {
                    now_ms += 100;
                    hw.tick(now_ms);
                    app.tick(now_ms, &mut hw, &mut nvs, &mut sink);
                }
            }
        }

        now_ms += 100;
        hw.tick(now_ms);
        app.tick(now_ms, &mut hw, &mut nvs, &mut sink);

        assert!(app.accrual().fuel_secs() <= config.max_tank_secs);
        assert!(app.sequencer().retries() <= config.max_start_retries + 2);
        if app.phase() == Phase::Stop(StopStep::End) {
            assert!((0..hw.relay_count()).all(|i| !hw.relay_state(i)));
        }
    }
});
