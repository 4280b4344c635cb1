//! Generator Controller Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   NvsAdapter   Monotonic  │
//! │  (Sensor+Actuator+Tel.) (EventSink)    (Config+NVS) (Clock)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Sequencer · edges/pacing · accrual                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use genctl::adapters::console;
use genctl::adapters::hardware::HardwareAdapter;
use genctl::adapters::log_sink::LogEventSink;
use genctl::adapters::nvs::NvsAdapter;
use genctl::adapters::time::MonotonicClock;
use genctl::app::ports::{ClockPort, ConfigPort};
use genctl::app::service::AppService;
use genctl::config::ControllerConfig;
use genctl::drivers::{hw_init, watchdog::Watchdog};
use genctl::error::Error;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("genctl v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals (outputs come up LOW) ──────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    let watchdog = Watchdog::default();

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let mut nvs = NvsAdapter::new().map_err(Error::from)?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            ControllerConfig::default()
        }
    };

    // ── 4. Adapters + service ─────────────────────────────────
    let clock = MonotonicClock::new();
    let mut hw = HardwareAdapter::from_pins();
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());

    hw.tick(clock.now_ms());
    app.boot(clock.now_ms(), &mut hw, &nvs, &mut log_sink);

    // Bare-board stand-in for the home-automation bridge.
    let console_rx = console::spawn_reader()?;

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let loop_delay = std::time::Duration::from_millis(u64::from(config.control_loop_interval_ms));
    loop {
        let now_ms = clock.now_ms();
        hw.tick(now_ms);
        while let Ok(line) = console_rx.try_recv() {
            match console::parse(&line) {
                Ok(req) => {
                    console::dispatch(req, now_ms, &mut app, &mut hw, &mut nvs, &mut log_sink)
                }
                Err(e) => warn!("Console: {} in {:?}", e, line),
            }
        }
        app.tick(now_ms, &mut hw, &mut nvs, &mut log_sink);

        // Config auto-save (5s debounce after last change).
        app.auto_save_if_needed(now_ms, &nvs);

        watchdog.feed();
        std::thread::sleep(loop_delay);
    }
}
