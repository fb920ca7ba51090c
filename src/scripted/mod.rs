// src/scripted/mod.rs

//! Config-driven stand-ins for the machine's hardware and operator.
//!
//! - [`outputs`] is a shared table of actuator outputs that scripted
//!   commands write to (instead of real motor controllers).
//! - [`command`] provides [`ScriptedCommand`], a command described entirely
//!   by configuration.
//! - [`script`] replays recorded operator inputs and the match phase plan.

pub mod command;
pub mod outputs;
pub mod script;

pub use command::ScriptedCommand;
pub use outputs::OutputTable;
pub use script::{InputSample, InputScript, Phase, PhasePlan};
