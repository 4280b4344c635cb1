//! Line-oriented serial console.
//!
//! Stands in for the home-automation bridge on a bare board: it drives the
//! virtual control switch, feeds the active-power register and forwards
//! operator commands into the [`AppService`].
//!
//! ```text
//! switch on|off          virtual control switch
//! power <watts>          active-power register
//! fuel <liters>          positive sets the tank, negative subtracts
//! save counters|config
//! force <regime> <step>  raw-coded jump (bench use only)
//! ```

use core::fmt;
use std::io::{BufRead, ErrorKind};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use log::{info, warn};

use crate::adapters::hardware::HardwareAdapter;
use crate::app::commands::AppCommand;
use crate::app::ports::{EventSink, StoragePort};
use crate::app::service::AppService;

/// Reader thread stack; line buffering only.
const READER_STACK_BYTES: usize = 4096;
/// Back-off while the console has nothing to read.
const READER_POLL: Duration = Duration::from_millis(50);

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleRequest {
    Switch(bool),
    Power(f32),
    Command(AppCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    Empty,
    UnknownCommand,
    MissingArgument(&'static str),
    BadArgument(&'static str),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument(what) => write!(f, "missing {what}"),
            Self::BadArgument(what) => write!(f, "bad {what}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

/// Parse one console line.  Keywords are case-insensitive.
pub fn parse(line: &str) -> Result<ConsoleRequest, ConsoleError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ConsoleError::Empty)?.to_ascii_lowercase();
    let mut arg = |what: &'static str| words.next().ok_or(ConsoleError::MissingArgument(what));

    match verb.as_str() {
        "switch" => match arg("state")?.to_ascii_lowercase().as_str() {
            "on" | "1" => Ok(ConsoleRequest::Switch(true)),
            "off" | "0" => Ok(ConsoleRequest::Switch(false)),
            _ => Err(ConsoleError::BadArgument("state")),
        },
        "power" => number(arg("watts")?, "watts").map(ConsoleRequest::Power),
        "fuel" => number(arg("liters")?, "liters")
            .map(|liters| ConsoleRequest::Command(AppCommand::AdjustFuel(liters))),
        "save" => match arg("target")?.to_ascii_lowercase().as_str() {
            "counters" => Ok(ConsoleRequest::Command(AppCommand::SaveCounters)),
            "config" => Ok(ConsoleRequest::Command(AppCommand::SaveConfig)),
            _ => Err(ConsoleError::BadArgument("target")),
        },
        "force" => {
            let regime = arg("regime")?
                .parse()
                .map_err(|_| ConsoleError::BadArgument("regime"))?;
            let step = arg("step")?
                .parse()
                .map_err(|_| ConsoleError::BadArgument("step"))?;
            Ok(ConsoleRequest::Command(AppCommand::ForcePhase { regime, step }))
        }
        _ => Err(ConsoleError::UnknownCommand),
    }
}

fn number(word: &str, what: &'static str) -> Result<f32, ConsoleError> {
    word.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ConsoleError::BadArgument(what))
}

/// Apply a parsed request.  Input changes are picked up by the next tick.
pub fn dispatch(
    request: ConsoleRequest,
    now_ms: u64,
    app: &mut AppService,
    hw: &mut HardwareAdapter,
    store: &mut impl StoragePort,
    sink: &mut impl EventSink,
) {
    match request {
        ConsoleRequest::Switch(on) => {
            info!("Console: control switch {}", if on { "ON" } else { "OFF" });
            hw.sensors_mut().set_control_switch(on);
        }
        ConsoleRequest::Power(watts) => {
            let index = app.current_config().io.modbus_power;
            hw.sensors_mut().set_modbus(index, watts);
        }
        ConsoleRequest::Command(cmd) => app.handle_command(cmd, now_ms, hw, store, sink),
    }
}

/// Read stdin on a helper thread and hand complete lines to the control loop.
pub fn spawn_reader() -> std::io::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(READER_STACK_BYTES)
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                // A partial line stays buffered across WouldBlock.
                match stdin.lock().read_line(&mut line) {
                    Ok(_) if line.ends_with('\n') => {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() && tx.send(trimmed.to_owned()).is_err() {
                            break;
                        }
                        line.clear();
                    }
                    Ok(_) => std::thread::sleep(READER_POLL),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {
                        std::thread::sleep(READER_POLL)
                    }
                    Err(e) => {
                        warn!("Console: read failed ({}), reader stopped", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
