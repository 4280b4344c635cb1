//! Hardware adapter: bridges the board's peripherals to the domain ports.
//!
//! Owns the [`SensorHub`], the relay bank, the pulse buttons and the
//! telemetry channel table, exposing them through [`SensorPort`],
//! [`ActuatorPort`] and [`TelemetryPort`].  On non-espidf targets the
//! drivers underneath run their simulation stubs, so the same adapter
//! backs the host simulation.
//!
//! Call [`HardwareAdapter::tick`] once per control loop iteration before
//! the domain runs: it releases finished button pulses and refreshes the
//! input cache.

use heapless::Vec;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort, TelemetryPort};
use crate::drivers::button::PulseButtons;
use crate::drivers::relay::RelayBank;
use crate::pins;
use crate::sensors::SensorHub;

pub struct HardwareAdapter {
    sensors: SensorHub,
    relays: RelayBank,
    buttons: PulseButtons,
    outputs: Vec<f32, { pins::TELEMETRY_CHANNELS }>,
    now_ms: u64,
}

impl HardwareAdapter {
    pub fn new(sensors: SensorHub, relays: RelayBank, buttons: PulseButtons) -> Self {
        let mut outputs = Vec::new();
        for _ in 0..pins::TELEMETRY_CHANNELS {
            let _ = outputs.push(0.0);
        }
        Self {
            sensors,
            relays,
            buttons,
            outputs,
            now_ms: 0,
        }
    }

    /// Adapter wired per [`pins`].
    pub fn from_pins() -> Self {
        Self::new(
            SensorHub::from_pins(),
            RelayBank::new(&pins::RELAY_GPIOS),
            PulseButtons::new(&pins::BUTTON_GPIOS, pins::BUTTON_PULSE_MS),
        )
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.buttons.tick(now_ms);
        self.sensors.refresh();
    }

    pub fn sensors_mut(&mut self) -> &mut SensorHub {
        &mut self.sensors
    }

    /// Whether a button pulse is still being held.
    pub fn is_button_high(&self, index: usize) -> bool {
        self.buttons.is_high(index)
    }

    pub fn button_press_count(&self) -> u32 {
        self.buttons.press_count()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_analog(&self, index: usize) -> f32 {
        self.sensors.analog(index)
    }

    fn read_binary(&self, index: usize) -> bool {
        self.sensors.binary(index)
    }

    fn is_binary_present(&self, index: usize) -> bool {
        self.sensors.is_binary_present(index)
    }

    fn read_modbus(&self, index: usize) -> f32 {
        self.sensors.modbus(index)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_relay(&mut self, index: usize, on: bool) {
        if !self.relays.set(index, on) {
            warn!("relay {} not wired, ignoring", index);
        }
    }

    fn relay_state(&self, index: usize) -> bool {
        self.relays.is_on(index)
    }

    fn relay_count(&self) -> usize {
        self.relays.len()
    }

    fn press_button(&mut self, index: usize) {
        if !self.buttons.press(index, self.now_ms) {
            warn!("button {} not wired, ignoring", index);
        }
    }

    fn all_relays_off(&mut self) {
        self.relays.all_off();
    }
}

// ── TelemetryPort implementation ──────────────────────────────

impl TelemetryPort for HardwareAdapter {
    fn publish_output(&mut self, index: usize, value: f32) {
        match self.outputs.get_mut(index) {
            Some(slot) => *slot = value,
            None => warn!("telemetry channel {} out of range", index),
        }
    }

    fn read_output(&self, index: usize) -> f32 {
        self.outputs.get(index).copied().unwrap_or(0.0)
    }
}
