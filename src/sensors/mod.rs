//! Sensor subsystem: analog inputs, binary inputs, the Modbus cache, and
//! the aggregating [`SensorHub`].
//!
//! The hub is refreshed once per control tick; port reads then come from
//! its cache so one tick sees one consistent set of inputs.
//!
//! Binary slot layout follows [`pins`]: IN1..IN6, the mains detector, then
//! the virtual control switch (no pad, written by the home-automation
//! bridge through [`SensorHub::set_control_switch`]).

pub mod analog;

use heapless::Vec;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;
use analog::AnalogInput;

pub const MAX_ANALOG: usize = 8;
pub const MAX_BINARY: usize = 8;
pub const MAX_MODBUS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct BinaryInput {
    /// `None` for a virtual input.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: Option<i32>,
    level: bool,
}

pub struct SensorHub {
    analog: Vec<AnalogInput, MAX_ANALOG>,
    binary: Vec<BinaryInput, MAX_BINARY>,
    modbus: Vec<f32, MAX_MODBUS>,
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::from_pins()
    }
}

impl SensorHub {
    /// Hub wired per [`pins`].
    pub fn from_pins() -> Self {
        let mut hub = Self {
            analog: Vec::new(),
            binary: Vec::new(),
            modbus: Vec::new(),
        };
        for &channel in &pins::ADC1_CHANNELS {
            let _ = hub.analog.push(AnalogInput::new(channel));
        }
        for &gpio in &pins::BINARY_GPIOS {
            let _ = hub.binary.push(BinaryInput {
                gpio: Some(gpio),
                level: false,
            });
        }
        // IN_CONTROL_SWITCH
        let _ = hub.binary.push(BinaryInput {
            gpio: None,
            level: false,
        });
        for _ in 0..=pins::MODBUS_FREQUENCY {
            let _ = hub.modbus.push(0.0);
        }
        hub
    }

    /// Sample every physical input into the cache.
    pub fn refresh(&mut self) {
        for input in self.analog.iter_mut() {
            input.sample();
        }
        #[cfg(target_os = "espidf")]
        for input in self.binary.iter_mut() {
            if let Some(gpio) = input.gpio {
                input.level = hw_init::gpio_read(gpio);
            }
        }
    }

    pub fn analog(&self, index: usize) -> f32 {
        self.analog.get(index).map_or(0.0, AnalogInput::value)
    }

    pub fn binary(&self, index: usize) -> bool {
        self.binary.get(index).is_some_and(|b| b.level)
    }

    pub fn is_binary_present(&self, index: usize) -> bool {
        index < self.binary.len()
    }

    pub fn modbus(&self, index: usize) -> f32 {
        self.modbus.get(index).copied().unwrap_or(0.0)
    }

    /// Latest register value from the Modbus poller.
    pub fn set_modbus(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.modbus.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_control_switch(&mut self, on: bool) {
        if let Some(input) = self.binary.get_mut(pins::IN_CONTROL_SWITCH) {
            input.level = on;
        }
    }

    // ── Simulation ────────────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_analog(&mut self, index: usize, units: f32) {
        if let Some(input) = self.analog.get_mut(index) {
            input.sim_set(units);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_binary(&mut self, index: usize, level: bool) {
        if let Some(input) = self.binary.get_mut(index) {
            input.level = level;
        }
    }
}
