//! Relay bank driver (opto-isolated relay board, active HIGH).
//!
//! Dumb actuator: remembers the commanded level of every relay and mirrors
//! it onto the GPIO pad.  Indices past the end of the bank are ignored.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pads via hw_init helpers.
//! On host/test: tracks state in-memory only.

use heapless::Vec;
use log::{info, warn};

use crate::drivers::hw_init;

/// Upper bound on relays per board.
pub const MAX_RELAYS: usize = 8;

pub struct RelayBank {
    gpios: Vec<i32, MAX_RELAYS>,
    states: Vec<bool, MAX_RELAYS>,
}

impl RelayBank {
    /// One relay per GPIO; extra pads beyond [`MAX_RELAYS`] are dropped.
    pub fn new(gpios: &[i32]) -> Self {
        let mut bank = Self {
            gpios: Vec::new(),
            states: Vec::new(),
        };
        for &gpio in gpios.iter().take(MAX_RELAYS) {
            // Capacity checked by `take` above.
            let _ = bank.gpios.push(gpio);
            let _ = bank.states.push(false);
        }
        bank
    }

    /// Drive one relay.  Returns `false` if `index` has no relay behind it.
    pub fn set(&mut self, index: usize, on: bool) -> bool {
        let (Some(&gpio), Some(state)) = (self.gpios.get(index), self.states.get_mut(index)) else {
            warn!("Relay: no relay at index {}", index);
            return false;
        };
        if *state != on {
            info!("Relay {} (GPIO {}) -> {}", index, gpio, if on { "ON" } else { "OFF" });
        }
        hw_init::gpio_write(gpio, on);
        *state = on;
        true
    }

    pub fn is_on(&self, index: usize) -> bool {
        self.states.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn all_off(&mut self) {
        for index in 0..self.len() {
            self.set(index, false);
        }
    }
}
