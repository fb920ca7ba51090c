// src/scheduler/holders.rs

//! Resource -> holder table.

use crate::command::CommandId;
use crate::resource::{ResourceId, ResourceSet};

/// Records which command currently holds each resource.
///
/// This is the single source of truth for ownership: resources carry no
/// holder reference of their own, and "running" for a command with
/// requirements means holding every entry here.
#[derive(Debug, Default)]
pub struct HolderTable {
    holders: Vec<Option<CommandId>>,
}

impl HolderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for a newly registered resource.
    pub(crate) fn add_resource(&mut self) {
        self.holders.push(None);
    }

    pub fn holder_of(&self, resource: ResourceId) -> Option<CommandId> {
        self.holders.get(resource.0).copied().flatten()
    }

    /// Distinct commands other than `command` holding any of `required`,
    /// in resource order.
    pub fn conflicting_holders(&self, command: CommandId, required: &ResourceSet) -> Vec<CommandId> {
        let mut conflicts = Vec::new();
        for resource in required {
            if let Some(holder) = self.holder_of(*resource) {
                if holder != command && !conflicts.contains(&holder) {
                    conflicts.push(holder);
                }
            }
        }
        conflicts
    }

    /// Assign every resource in `required` to `command`.
    ///
    /// Callers must have released previous holders first.
    pub(crate) fn acquire(&mut self, command: CommandId, required: &ResourceSet) {
        for resource in required {
            if let Some(slot) = self.holders.get_mut(resource.0) {
                debug_assert!(slot.is_none() || *slot == Some(command));
                *slot = Some(command);
            }
        }
    }

    /// Release every resource in `required` that `command` holds.
    pub(crate) fn release(&mut self, command: CommandId, required: &ResourceSet) {
        for resource in required {
            if let Some(slot) = self.holders.get_mut(resource.0) {
                if *slot == Some(command) {
                    *slot = None;
                }
            }
        }
    }

    /// Resources with no holder, in id order.
    pub fn idle_resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.holders
            .iter()
            .enumerate()
            .filter(|(_, holder)| holder.is_none())
            .map(|(idx, _)| ResourceId(idx))
    }
}
