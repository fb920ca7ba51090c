// src/scheduler/mod.rs

//! The tick-driven command scheduler.
//!
//! - [`command_scheduler`] contains [`Scheduler`], the single arbiter of which
//!   command holds which resource.
//! - [`holders`] is the resource -> holder table (the only record of
//!   ownership).
//! - `slot` keeps per-command registration data and lifecycle state.
//! - [`tick_report`] describes what changed during a tick.

pub mod command_scheduler;
pub mod holders;
mod slot;
pub mod tick_report;

pub use command_scheduler::Scheduler;
pub use holders::HolderTable;
pub use tick_report::TickReport;
