// src/resource.rs

//! Exclusive-use resources ("subsystems").
//!
//! A resource is passive data: a stable handle, a name for diagnostics and
//! an optional default command. Who currently holds a resource is recorded
//! only in the scheduler's holder table.

use std::collections::BTreeSet;
use std::fmt;

use crate::command::CommandId;

/// Stable handle for a resource registered with a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// The set of resources a command requires.
///
/// Ordered so that conflict resolution visits resources deterministically.
pub type ResourceSet = BTreeSet<ResourceId>;

/// Static information about a registered resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub(crate) id: ResourceId,
    pub(crate) name: String,
    /// Assigned once through `register_default`, immutable afterwards.
    pub(crate) default_command: Option<CommandId>,
}

impl Resource {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_command(&self) -> Option<CommandId> {
        self.default_command
    }
}
