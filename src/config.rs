//! Controller configuration parameters
//!
//! Every timing and policy constant of the start/stop choreography lives
//! here, together with the logical wiring of gateway indices.  Defaults
//! reproduce the field-proven values; any of them can be overridden via
//! NVS or [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use serde::{Deserialize, Serialize};

use crate::pins;

/// Logical role → gateway index wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoMap {
    // --- Relays ---
    pub relay_fuel: usize,
    pub relay_engine: usize,
    pub relay_starter: usize,
    pub relay_load: usize,

    // --- Buttons ---
    pub button_air_close: usize,
    pub button_air_open: usize,

    // --- Inputs ---
    /// Analog input compared against `running_threshold`.
    pub running_signal: usize,
    /// Binary input that reads HIGH when the choke is already closed.
    pub choke_closed: usize,
    pub control_switch: usize,
    pub mains_present: usize,
    pub modbus_power: usize,

    // --- Telemetry channels ---
    pub out_regime: usize,
    pub out_step: usize,
    pub out_timeout: usize,
    pub out_motohr: usize,
    pub out_gas: usize,
    pub out_fuel_set: usize,
    pub out_power_total: usize,
    pub out_power_save: usize,
}

impl Default for IoMap {
    fn default() -> Self {
        Self {
            relay_fuel: pins::RELAY_FUEL,
            relay_engine: pins::RELAY_ENGINE,
            relay_starter: pins::RELAY_STARTER,
            relay_load: pins::RELAY_LOAD,

            button_air_close: pins::BUTTON_AIR_CLOSE,
            button_air_open: pins::BUTTON_AIR_OPEN,

            running_signal: pins::ADC_AI3,
            choke_closed: pins::IN5,
            control_switch: pins::IN_CONTROL_SWITCH,
            mains_present: pins::IN_AC_CTRL,
            modbus_power: pins::MODBUS_ACTIVE_POWER,

            out_regime: pins::VAL_REGIME,
            out_step: pins::VAL_STEP,
            out_timeout: pins::VAL_TIMEOUT,
            out_motohr: pins::VAL_MOTOHR,
            out_gas: pins::VAL_GAS,
            out_fuel_set: pins::VAL_FUEL_SET,
            out_power_total: pins::VAL_POWER_TOTAL,
            out_power_save: pins::VAL_POWER_SAVE,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Timing ---
    /// Minimum spacing between two sequencer steps (milliseconds)
    pub step_interval_ms: u32,
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- START sequence ---
    /// Fuel priming pause after opening the fuel valve (seconds)
    pub fuel_prime_secs: u32,
    /// Longest single crank (seconds)
    pub starter_timeout_secs: u32,
    /// Pause between catching and opening the choke (seconds)
    pub choke_open_delay_secs: u32,
    /// Pause between a failed crank and the next attempt (seconds)
    pub restart_pause_secs: u32,
    /// Warm-up before the load contactor closes (seconds)
    pub load_settle_secs: u32,
    /// Re-cranks tolerated after the first failed crank; one more failure
    /// abandons the start
    pub max_start_retries: u32,

    // --- STOP sequence ---
    /// Run-down with the load shed before the engine is killed (seconds)
    pub load_shed_settle_secs: u32,

    // --- Mains failover ---
    /// Mains must stay back this long before the generator is shut down (seconds)
    pub mains_return_cooldown_secs: u32,
    /// Mains must stay away this long before the generator is cranked (seconds)
    pub mains_loss_confirm_secs: u32,

    // --- Running detection ---
    /// Analog running-signal level above which the engine counts as running
    pub running_threshold: f32,

    // --- Accrual ---
    /// Run time is folded into the counters in segments of this length (seconds)
    pub accrual_segment_secs: u32,
    /// Minimum spacing of counter writes while running (seconds)
    pub persist_interval_secs: u32,
    /// Running time a full tank lasts (seconds)
    pub max_tank_secs: u32,
    /// Usable tank volume (liters)
    pub tank_capacity_liters: f32,
    /// Fuel commands smaller than this magnitude are ignored (liters)
    pub fuel_command_deadband: f32,

    // --- Wiring ---
    pub io: IoMap,
}

impl ControllerConfig {
    /// Seconds of running time bought by one liter of fuel.
    pub fn secs_per_liter(&self) -> f32 {
        self.max_tank_secs as f32 / self.tank_capacity_liters
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Timing
            step_interval_ms: 500,
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 60,   // 1/min

            // START
            fuel_prime_secs: 5,
            starter_timeout_secs: 15,
            choke_open_delay_secs: 3,
            restart_pause_secs: 15,
            load_settle_secs: 30,
            max_start_retries: 6,

            // STOP
            load_shed_settle_secs: 20,

            // Failover
            mains_return_cooldown_secs: 15 * 60,
            mains_loss_confirm_secs: 30 * 60,

            running_threshold: 10.0,

            // Accrual
            accrual_segment_secs: 60,
            persist_interval_secs: 900,
            max_tank_secs: 30_600, // 8.5 h on a full tank
            tank_capacity_liters: 25.0,
            fuel_command_deadband: 0.5,

            io: IoMap::default(),
        }
    }
}
