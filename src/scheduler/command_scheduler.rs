// src/scheduler/command_scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::command::{Command, CommandId, CommandState, Hook};
use crate::errors::{CmdloopError, Result};
use crate::resource::{Resource, ResourceId, ResourceSet};
use crate::scheduler::holders::HolderTable;
use crate::scheduler::slot::CommandSlot;
use crate::scheduler::tick_report::TickReport;
use crate::trigger::{ActivationMode, Binding, BindingAction, InputSource};

/// Cooperative, single-threaded command scheduler.
///
/// It is responsible for:
/// - registering resources, commands, default commands and bindings
/// - starting commands, interrupting whoever holds a resource they need
/// - stepping every running command once per tick
/// - retiring finished commands and re-arming defaults for idle resources
///
/// Setup happens once before the control loop starts; afterwards
/// [`Scheduler::tick`] is called once per control period.
#[derive(Debug, Default)]
pub struct Scheduler {
    resources: Vec<Resource>,
    resource_names: HashMap<String, ResourceId>,
    commands: Vec<CommandSlot>,
    command_names: HashMap<String, CommandId>,
    holders: HolderTable,
    bindings: Vec<Binding>,
    tick_count: u64,
    /// Monotonically increasing activation sequence number.
    activation_counter: u64,
    /// Transitions accumulated since the last tick report was handed out.
    report: TickReport,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Register a resource. Names must be unique.
    pub fn add_resource(&mut self, name: impl Into<String>) -> Result<ResourceId> {
        let name = name.into();
        if self.resource_names.contains_key(&name) {
            return Err(CmdloopError::ConfigError(format!(
                "resource '{name}' is registered twice"
            )));
        }

        let id = ResourceId(self.resources.len());
        self.resources.push(Resource {
            id,
            name: name.clone(),
            default_command: None,
        });
        self.holders.add_resource();
        self.resource_names.insert(name.clone(), id);

        debug!(resource = %name, %id, "registered resource");
        Ok(id)
    }

    /// Register a command. Its requirement set is captured now and never
    /// re-read; every required resource must already be registered.
    pub fn add_command(&mut self, command: impl Command + 'static) -> Result<CommandId> {
        let name = command.name().to_string();
        if self.command_names.contains_key(&name) {
            return Err(CmdloopError::ConfigError(format!(
                "command '{name}' is registered twice"
            )));
        }

        if let Some(unknown) = command
            .requirements()
            .iter()
            .find(|r| r.0 >= self.resources.len())
        {
            return Err(CmdloopError::ConfigError(format!(
                "command '{name}' requires unregistered {unknown}"
            )));
        }

        let id = CommandId(self.commands.len());
        let slot = CommandSlot::new(id, Box::new(command));
        debug!(
            command = %name,
            %id,
            requires = ?self.resource_names_of(&slot.requirements),
            "registered command"
        );
        self.commands.push(slot);
        self.command_names.insert(name, id);
        Ok(id)
    }

    /// Bind `command` as the fallback for `resource`.
    ///
    /// Fails if the resource already has a default, or if the command's
    /// requirement set is not exactly `{resource}`.
    pub fn register_default(&mut self, resource: ResourceId, command: CommandId) -> Result<()> {
        let requirements = &self.slot(command)?.requirements;
        let res = self
            .resources
            .get(resource.0)
            .ok_or_else(|| CmdloopError::UnknownResource(resource.to_string()))?;

        if let Some(existing) = res.default_command {
            return Err(CmdloopError::ConfigError(format!(
                "resource '{}' already has default command '{}'",
                res.name,
                self.commands[existing.0].name()
            )));
        }

        if requirements.len() != 1 || !requirements.contains(&resource) {
            return Err(CmdloopError::ConfigError(format!(
                "default command '{}' for resource '{}' must require exactly that resource (requires {:?})",
                self.commands[command.0].name(),
                res.name,
                self.resource_names_of(requirements)
            )));
        }

        info!(
            resource = %res.name,
            command = %self.commands[command.0].name(),
            "registered default command"
        );
        self.resources[resource.0].default_command = Some(command);
        Ok(())
    }

    /// Wire an input source to `command`. Bindings are polled in
    /// registration order at the beginning of every tick.
    pub fn bind(
        &mut self,
        source: impl InputSource + 'static,
        mode: ActivationMode,
        command: CommandId,
    ) -> Result<()> {
        let name = self.slot(command)?.name().to_string();
        debug!(command = %name, %mode, "registered binding");
        self.bindings.push(Binding::new(Box::new(source), mode, command));
        Ok(())
    }

    /// Reset every binding's edge state.
    ///
    /// Used when ticking resumes after a suspension: inputs that stayed
    /// active meanwhile fire their press edge again on the next tick.
    pub fn reset_bindings(&mut self) {
        for binding in &mut self.bindings {
            binding.reset();
        }
        debug!(bindings = self.bindings.len(), "binding edge state reset");
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start `command` now.
    ///
    /// - A command that is already running is cancelled first and then
    ///   started fresh, so `on_start` fires once per activation.
    /// - Every other command holding a required resource is interrupted and
    ///   releases all of its resources before `on_start` runs.
    pub fn start(&mut self, command: CommandId) -> Result<()> {
        if self.slot(command)?.is_running() {
            info!(command = %self.commands[command.0].name(), "restarting running command");
            self.end_command(command, true)?;
        }

        let conflicts = self
            .holders
            .conflicting_holders(command, &self.commands[command.0].requirements);
        for other in conflicts {
            info!(
                interrupted = %self.commands[other.0].name(),
                by = %self.commands[command.0].name(),
                "resource conflict; interrupting holder"
            );
            self.end_command(other, true)?;
        }

        self.activation_counter += 1;
        let slot = &mut self.commands[command.0];
        self.holders.acquire(command, &slot.requirements);
        slot.activation = Some(self.activation_counter);
        slot.state = CommandState::Starting;

        info!(command = %slot.name(), activation = self.activation_counter, "starting command");
        let result = slot.command.on_start();
        slot.state = CommandState::Running;
        self.report.started.push(command);

        result.map_err(|source| CmdloopError::hook(slot.command.name(), Hook::Start, source))
    }

    /// Cancel `command` if it is running; a no-op otherwise.
    pub fn cancel(&mut self, command: CommandId) -> Result<()> {
        if !self.slot(command)?.is_running() {
            debug!(command = %self.commands[command.0].name(), "cancel of idle command ignored");
            return Ok(());
        }
        info!(command = %self.commands[command.0].name(), "cancelling command");
        self.end_command(command, true)
    }

    /// Cancel every running command, most recently started last.
    pub fn cancel_all(&mut self) -> Result<()> {
        let running = self.running_commands();
        if !running.is_empty() {
            info!(count = running.len(), "cancelling all running commands");
        }
        for id in running {
            self.end_command(id, true)?;
        }
        Ok(())
    }

    /// Run one control cycle.
    ///
    /// Order of operations:
    /// 1. poll bindings and apply their start/cancel requests
    /// 2. step every running command
    /// 3. retire commands whose `is_finished` now holds
    /// 4. start the default command of every idle resource that has one
    ///
    /// A hook failure aborts the tick and is returned as-is.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.tick_count += 1;
        let tick = self.tick_count;
        debug!(tick, "scheduler tick");

        // 1. Inputs.
        for idx in 0..self.bindings.len() {
            let Some(action) = self.bindings[idx].poll() else {
                continue;
            };
            let target = self.bindings[idx].target();
            debug!(
                tick,
                command = %self.commands[target.0].name(),
                mode = %self.bindings[idx].mode(),
                ?action,
                "binding fired"
            );
            match action {
                BindingAction::Start => self.start(target)?,
                BindingAction::Cancel => self.cancel(target)?,
            }
        }

        // 2. Step.
        let running = self.running_commands();
        for id in &running {
            let slot = &mut self.commands[id.0];
            slot.command
                .on_step()
                .map_err(|source| CmdloopError::hook(slot.command.name(), Hook::Step, source))?;
        }

        // 3. Retire.
        for id in running {
            let slot = &self.commands[id.0];
            if slot.is_running() && slot.command.is_finished() {
                self.end_command(id, false)?;
            }
        }

        // 4. Defaults.
        let idle: Vec<ResourceId> = self.holders.idle_resources().collect();
        for resource in idle {
            // Defaults require exactly their own resource, so starting one
            // never claims another idle resource in this loop.
            if let Some(default) = self.resources[resource.0].default_command {
                debug!(
                    tick,
                    resource = %self.resources[resource.0].name,
                    command = %self.commands[default.0].name(),
                    "resource idle; starting default command"
                );
                self.start(default)?;
            }
        }

        let mut report = std::mem::take(&mut self.report);
        report.tick = tick;
        Ok(report)
    }

    /// Shared exit path: run `on_end`, go back to `Idle` and release every
    /// required resource, even if the hook failed.
    fn end_command(&mut self, command: CommandId, interrupted: bool) -> Result<()> {
        let slot = &mut self.commands[command.0];
        if !slot.is_running() {
            warn!(command = %slot.name(), "end requested for command that is not running");
            return Ok(());
        }

        slot.state = if interrupted {
            CommandState::Interrupted
        } else {
            CommandState::Finishing
        };
        let result = slot.command.on_end(interrupted);
        slot.state = CommandState::Idle;
        slot.activation = None;
        self.holders.release(command, &slot.requirements);

        if interrupted {
            info!(command = %slot.name(), "command interrupted");
            self.report.interrupted.push(command);
        } else {
            info!(command = %slot.name(), "command finished");
            self.report.finished.push(command);
        }

        result.map_err(|source| CmdloopError::hook(slot.command.name(), Hook::End, source))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Running commands ordered by start time.
    pub fn running_commands(&self) -> Vec<CommandId> {
        let mut running: Vec<(u64, CommandId)> = self
            .commands
            .iter()
            .filter(|slot| slot.is_running())
            .map(|slot| (slot.activation.unwrap_or(0), slot.id))
            .collect();
        running.sort_unstable();
        running.into_iter().map(|(_, id)| id).collect()
    }

    pub fn is_running(&self, command: CommandId) -> bool {
        self.commands
            .get(command.0)
            .is_some_and(|slot| slot.is_running())
    }

    pub fn state_of(&self, command: CommandId) -> Option<CommandState> {
        self.commands.get(command.0).map(|slot| slot.state)
    }

    pub fn holder_of(&self, resource: ResourceId) -> Option<CommandId> {
        self.holders.holder_of(resource)
    }

    pub fn resource(&self, resource: ResourceId) -> Option<&Resource> {
        self.resources.get(resource.0)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resource_names.get(name).copied()
    }

    pub fn command_id(&self, name: &str) -> Option<CommandId> {
        self.command_names.get(name).copied()
    }

    pub fn command_name(&self, command: CommandId) -> Option<&str> {
        self.commands.get(command.0).map(|slot| slot.name())
    }

    /// Requirement set captured when `command` was registered.
    pub fn requirements_of(&self, command: CommandId) -> Option<&ResourceSet> {
        self.commands.get(command.0).map(|slot| &slot.requirements)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of completed calls to [`Scheduler::tick`].
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn slot(&self, command: CommandId) -> Result<&CommandSlot> {
        self.commands
            .get(command.0)
            .ok_or_else(|| CmdloopError::UnknownCommand(command.to_string()))
    }

    fn resource_names_of(&self, set: &ResourceSet) -> Vec<&str> {
        set.iter()
            .filter_map(|r| self.resources.get(r.0))
            .map(|r| r.name.as_str())
            .collect()
    }
}
