// src/engine/mod.rs

//! Control-loop engine for cmdloop.
//!
//! This module ties together:
//! - the command scheduler
//! - the operating-mode state machine (disabled / autonomous / teleop)
//! - scripted operator inputs and the match phase plan
//! - the fixed-period loop driver that reacts to:
//!   - period ticks
//!   - explicit mode changes
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

use crate::types::OperatingMode;

/// Events flowing into the loop core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// One control period elapsed.
    Tick,
    /// The driver switched operating mode.
    ModeChanged(OperatingMode),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Options for the async loop driver.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Control period.
    pub period: Duration,
    /// Run ticks back-to-back instead of waiting for each period.
    pub fast: bool,
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Loop periods processed, including disabled ones.
    pub loop_ticks: u64,
    /// Calls to `Scheduler::tick`.
    pub scheduler_ticks: u64,
    /// Ticks whose work took longer than the period.
    pub overruns: u64,
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreRuntime, CoreStep};
pub use self::runtime::Runtime;
