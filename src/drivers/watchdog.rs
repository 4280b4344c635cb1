//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the control loop
//! stalls for longer than the configured timeout.
//!
//! The main loop must call `feed()` on every control tick iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT calls are made from the main task only.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
                } else {
                    warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    subscribed,
                    timeout_ms,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {} ms, no-op", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
