//! Generator controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod accrual;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;

// Hardware-facing modules compile on host too; each keeps its simulation
// path behind the same cfg gates.
pub mod adapters;
pub mod drivers;
pub mod sensors;
