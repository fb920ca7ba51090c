// src/command/mod.rs

//! Commands: units of work with a four-hook lifecycle and a fixed set of
//! required resources.
//!
//! - [`Command`] is the capability interface every schedulable unit
//!   implements. Hooks are only ever called by the scheduler.
//! - [`group`] provides [`SequentialGroup`], a composite command that runs
//!   child commands one after another.

use std::fmt;

use crate::resource::ResourceSet;

pub mod group;

pub use group::{GroupStep, SequentialGroup, SequentialGroupBuilder};

/// Result type returned by command hooks.
///
/// A failing hook aborts the current tick; the scheduler never retries it.
pub type HookResult = anyhow::Result<()>;

/// Stable handle for a command registered with a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(pub(crate) usize);

impl CommandId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command#{}", self.0)
    }
}

/// Lifecycle state of a registered command.
///
/// `Starting`, `Finishing` and `Interrupted` are only observable while the
/// corresponding hook runs; between hook calls a command is either `Idle`
/// or `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Idle,
    Starting,
    Running,
    Finishing,
    Interrupted,
}

/// Which hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Start,
    Step,
    End,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hook::Start => "on_start",
            Hook::Step => "on_step",
            Hook::End => "on_end",
        };
        f.write_str(s)
    }
}

/// A schedulable unit of work.
///
/// Hooks must not block: the whole control cycle runs on one thread and has
/// to finish within a single period.
pub trait Command {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Resources this command needs exclusive use of.
    ///
    /// Read once when the command is registered; later changes are ignored.
    fn requirements(&self) -> &ResourceSet;

    /// One-time setup when the command starts running.
    fn on_start(&mut self) -> HookResult {
        Ok(())
    }

    /// Called once per tick while running.
    fn on_step(&mut self) -> HookResult {
        Ok(())
    }

    /// Evaluated after `on_step` every tick; `true` ends the command
    /// gracefully. Commands that only stop when cancelled keep the default.
    fn is_finished(&self) -> bool {
        false
    }

    /// Cleanup, called exactly once whenever the command leaves `Running`,
    /// whether it finished or was interrupted.
    fn on_end(&mut self, interrupted: bool) -> HookResult {
        let _ = interrupted;
        Ok(())
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requirements(&self) -> &ResourceSet {
        (**self).requirements()
    }

    fn on_start(&mut self) -> HookResult {
        (**self).on_start()
    }

    fn on_step(&mut self) -> HookResult {
        (**self).on_step()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn on_end(&mut self, interrupted: bool) -> HookResult {
        (**self).on_end(interrupted)
    }
}
