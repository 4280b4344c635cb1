//! Mock gateway and harness for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO registers.  Time is simulated with
//! [`SimClock`]; the harness ticks the service at the production loop
//! cadence.

use genctl::adapters::time::SimClock;
use genctl::app::events::AppEvent;
use genctl::app::ports::{
    ActuatorPort, ClockPort, EventSink, SensorPort, StorageError, StoragePort, TelemetryPort,
};
use genctl::app::service::AppService;
use genctl::config::ControllerConfig;
use genctl::pins;
use std::collections::HashMap;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetRelay { index: usize, on: bool },
    PressButton { index: usize },
    AllRelaysOff,
}

// ── MockGateway ───────────────────────────────────────────────

pub struct MockGateway {
    pub analog: [f32; 4],
    pub binary: [bool; 8],
    pub modbus: [f32; 3],
    relays: [bool; 6],
    outputs: [f32; pins::TELEMETRY_CHANNELS],
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            analog: [0.0; 4],
            binary: [false; 8],
            modbus: [0.0; 3],
            relays: [false; 6],
            outputs: [0.0; pins::TELEMETRY_CHANNELS],
            calls: Vec::new(),
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.analog[pins::ADC_AI3] = if running { 55.0 } else { 0.0 };
    }

    pub fn set_switch(&mut self, on: bool) {
        self.binary[pins::IN_CONTROL_SWITCH] = on;
    }

    pub fn set_mains(&mut self, present: bool) {
        self.binary[pins::IN_AC_CTRL] = present;
    }

    pub fn relay(&self, index: usize) -> bool {
        self.relays[index]
    }

    pub fn any_relay_on(&self) -> bool {
        self.relays.iter().any(|&r| r)
    }

    pub fn output(&self, index: usize) -> f32 {
        self.outputs[index]
    }

    pub fn presses(&self, index: usize) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::PressButton { index: i } if *i == index))
            .count()
    }

    pub fn relay_ever_on(&self, index: usize) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, ActuatorCall::SetRelay { index: i, on: true } if *i == index))
    }

    /// Position of the first call matching `call`.
    pub fn position(&self, call: ActuatorCall) -> Option<usize> {
        self.calls.iter().position(|c| *c == call)
    }

    /// Position of the last call matching `call`.
    pub fn last_position(&self, call: ActuatorCall) -> Option<usize> {
        self.calls.iter().rposition(|c| *c == call)
    }

    pub fn count(&self, call: ActuatorCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockGateway {
    fn read_analog(&self, index: usize) -> f32 {
        self.analog.get(index).copied().unwrap_or(0.0)
    }

    fn read_binary(&self, index: usize) -> bool {
        self.binary.get(index).copied().unwrap_or(false)
    }

    fn is_binary_present(&self, index: usize) -> bool {
        index < self.binary.len()
    }

    fn read_modbus(&self, index: usize) -> f32 {
        self.modbus.get(index).copied().unwrap_or(0.0)
    }
}

impl ActuatorPort for MockGateway {
    fn set_relay(&mut self, index: usize, on: bool) {
        self.calls.push(ActuatorCall::SetRelay { index, on });
        if let Some(relay) = self.relays.get_mut(index) {
            *relay = on;
        }
    }

    fn relay_state(&self, index: usize) -> bool {
        self.relays.get(index).copied().unwrap_or(false)
    }

    fn relay_count(&self) -> usize {
        self.relays.len()
    }

    fn press_button(&mut self, index: usize) {
        self.calls.push(ActuatorCall::PressButton { index });
    }

    fn all_relays_off(&mut self) {
        self.calls.push(ActuatorCall::AllRelaysOff);
        self.relays = [false; 6];
    }
}

impl TelemetryPort for MockGateway {
    fn publish_output(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.outputs.get_mut(index) {
            *slot = value;
        }
    }

    fn read_output(&self, index: usize) -> f32 {
        self.outputs.get(index).copied().unwrap_or(0.0)
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    data: HashMap<String, Vec<u8>>,
    pub writes: usize,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn counter(&self, key: &str) -> Option<u32> {
        let bytes = self.data.get(&format!("genctl::{}", key))?;
        Some(u32::from_le_bytes(bytes.as_slice().try_into().ok()?))
    }
}

impl StoragePort for MockStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let value = self
            .data
            .get(&format!("{}::{}", namespace, key))
            .ok_or(StorageError::NotFound)?;
        let n = value.len().min(buf.len());
        buf[..n].copy_from_slice(&value[..n]);
        Ok(n)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.data
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A booted [`AppService`] with everything it talks to.
pub struct Rig {
    pub app: AppService,
    pub hw: MockGateway,
    pub store: MockStore,
    pub sink: RecordingSink,
    pub clock: SimClock,
    tick_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with(ControllerConfig::default(), MockGateway::new(), MockStore::default())
    }

    pub fn with(config: ControllerConfig, hw: MockGateway, store: MockStore) -> Self {
        let tick_ms = u64::from(config.control_loop_interval_ms);
        let mut rig = Self {
            app: AppService::new(config),
            hw,
            store,
            sink: RecordingSink::default(),
            clock: SimClock::new(0),
            tick_ms,
        };
        rig.app
            .boot(rig.clock.now_ms(), &mut rig.hw, &rig.store, &mut rig.sink);
        rig
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// One control tick at the current simulated time.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.app
            .tick(now, &mut self.hw, &mut self.store, &mut self.sink);
    }

    /// Advance the clock by `ms`, ticking at the control loop cadence.
    pub fn run_for(&mut self, ms: u64) {
        let end = self.clock.now_ms() + ms;
        while self.clock.now_ms() < end {
            self.clock.advance_ms(self.tick_ms);
            self.tick();
        }
    }

    pub fn run_for_secs(&mut self, secs: u64) {
        self.run_for(secs * 1000);
    }
}
