//! ADC-backed analog input.
//!
//! Converts the raw 12-bit reading into engineering units with a linear
//! zero/span calibration.  The generator's alternator sense on AI3 is the
//! only input the controller acts on; the others are published as-is.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: samples ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: the value is injected with [`AnalogInput::sim_set`].

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Raw count that maps to 0 units.
    pub zero_raw: u16,
    /// Raw count that maps to `span_units`.
    pub span_raw: u16,
    pub span_units: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            zero_raw: 0,
            span_raw: pins::ADC_FULL_SCALE,
            span_units: pins::ADC_SCALE_UNITS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalogInput {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
    cal: Calibration,
    value: f32,
}

impl AnalogInput {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            cal: Calibration::default(),
            value: 0.0,
        }
    }

    pub fn set_calibration(&mut self, cal: Calibration) {
        self.cal = cal;
    }

    /// Take a fresh sample.  No-op off target.
    pub fn sample(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            self.value = self.raw_to_units(hw_init::adc1_read(self.channel));
        }
    }

    /// Last sampled value in engineering units.
    pub fn value(&self) -> f32 {
        self.value
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set(&mut self, units: f32) {
        self.value = units;
    }

    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    fn raw_to_units(&self, raw: u16) -> f32 {
        if raw <= self.cal.zero_raw || self.cal.span_raw <= self.cal.zero_raw {
            return 0.0;
        }
        let range = f32::from(self.cal.span_raw - self.cal.zero_raw);
        f32::from(raw - self.cal.zero_raw) / range * self.cal.span_units
    }
}
