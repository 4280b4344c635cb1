//! Momentary button emulation.
//!
//! The choke controller expects a short push on its AIR CLOSE / AIR OPEN
//! inputs, not a held level.  [`PulseButtons::press`] raises the line and
//! [`PulseButtons::tick`] drops it again once the pulse width has passed,
//! so the caller never blocks.
//!
//! ```text
//!   press(t0)            tick(t ≥ t0 + width)
//!      │                      │
//!  ────┘▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔└────
//! ```
//!
//! A press on a line that is still high restarts its pulse.

use heapless::Vec;
use log::{info, warn};

use crate::drivers::hw_init;

pub const MAX_BUTTONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Low,
    High { release_at_ms: u64 },
}

pub struct PulseButtons {
    gpios: Vec<i32, MAX_BUTTONS>,
    lines: Vec<Line, MAX_BUTTONS>,
    pulse_ms: u64,
    presses: u32,
}

impl PulseButtons {
    pub fn new(gpios: &[i32], pulse_ms: u64) -> Self {
        let mut buttons = Self {
            gpios: Vec::new(),
            lines: Vec::new(),
            pulse_ms,
            presses: 0,
        };
        for &gpio in gpios.iter().take(MAX_BUTTONS) {
            let _ = buttons.gpios.push(gpio);
            let _ = buttons.lines.push(Line::Low);
        }
        buttons
    }

    /// Start a pulse on `index`.  Returns `false` if there is no such button.
    pub fn press(&mut self, index: usize, now_ms: u64) -> bool {
        let (Some(&gpio), Some(line)) = (self.gpios.get(index), self.lines.get_mut(index)) else {
            warn!("Button: no button at index {}", index);
            return false;
        };
        info!("Button {} (GPIO {}) pressed", index, gpio);
        hw_init::gpio_write(gpio, true);
        *line = Line::High {
            release_at_ms: now_ms + self.pulse_ms,
        };
        self.presses = self.presses.wrapping_add(1);
        true
    }

    /// Release every line whose pulse has run its course.
    pub fn tick(&mut self, now_ms: u64) {
        for (line, &gpio) in self.lines.iter_mut().zip(self.gpios.iter()) {
            if let Line::High { release_at_ms } = *line {
                if now_ms >= release_at_ms {
                    hw_init::gpio_write(gpio, false);
                    *line = Line::Low;
                }
            }
        }
    }

    pub fn is_high(&self, index: usize) -> bool {
        matches!(self.lines.get(index), Some(Line::High { .. }))
    }

    /// Presses issued since boot (all lines).
    pub fn press_count(&self) -> u32 {
        self.presses
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
