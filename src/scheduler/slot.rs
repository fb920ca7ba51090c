// src/scheduler/slot.rs

//! Per-command registration data and lifecycle state.

use std::fmt;

use crate::command::{Command, CommandId, CommandState};
use crate::resource::ResourceSet;

/// A registered command plus the scheduler's bookkeeping for it.
pub(crate) struct CommandSlot {
    pub id: CommandId,
    pub command: Box<dyn Command>,
    /// Snapshot of `command.requirements()` taken at registration.
    pub requirements: ResourceSet,
    pub state: CommandState,
    /// Sequence number of the current activation while running; orders the
    /// per-tick step phase by start time.
    pub activation: Option<u64>,
}

impl CommandSlot {
    pub fn new(id: CommandId, command: Box<dyn Command>) -> Self {
        let requirements = command.requirements().clone();
        Self {
            id,
            command,
            requirements,
            state: CommandState::Idle,
            activation: None,
        }
    }

    pub fn name(&self) -> &str {
        self.command.name()
    }

    pub fn is_running(&self) -> bool {
        self.state == CommandState::Running
    }
}

impl fmt::Debug for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSlot")
            .field("id", &self.id)
            .field("name", &self.command.name())
            .field("requirements", &self.requirements)
            .field("state", &self.state)
            .field("activation", &self.activation)
            .finish()
    }
}
