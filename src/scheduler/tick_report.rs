// src/scheduler/tick_report.rs

//! Summary of lifecycle transitions, useful for tests and diagnostics.

use crate::command::CommandId;

/// Structured result of a single [`Scheduler::tick`](crate::scheduler::Scheduler::tick).
///
/// Transitions caused by direct `start` / `cancel` calls made between ticks
/// are folded into the report of the next tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Scheduler tick number this report belongs to (1-based).
    pub tick: u64,
    /// Commands whose `on_start` ran, in call order.
    pub started: Vec<CommandId>,
    /// Commands that finished on their own (`on_end(false)`).
    pub finished: Vec<CommandId>,
    /// Commands that were cancelled or interrupted (`on_end(true)`).
    pub interrupted: Vec<CommandId>,
}

impl TickReport {
    /// Whether nothing started or stopped.
    pub fn is_quiet(&self) -> bool {
        self.started.is_empty() && self.finished.is_empty() && self.interrupted.is_empty()
    }
}
