// src/config/wiring.rs

//! Turn a validated [`ConfigFile`] into a ready-to-tick [`Scheduler`].

use std::time::Duration;

use tracing::{debug, info};

use crate::command::{Command, CommandId, SequentialGroup};
use crate::config::model::ConfigFile;
use crate::errors::{CmdloopError, Result};
use crate::resource::{ResourceId, ResourceSet};
use crate::scheduler::Scheduler;
use crate::scripted::{OutputTable, ScriptedCommand};
use crate::trigger::InputTable;

/// Everything the control loop needs from the robot description.
#[derive(Debug)]
pub struct Wiring {
    pub scheduler: Scheduler,
    /// Command started when the autonomous phase begins.
    pub autonomous: Option<CommandId>,
    pub period: Duration,
}

impl Wiring {
    /// Register resources, commands, groups, defaults and bindings.
    ///
    /// Every `[command]` and `[group]` entry becomes one top-level command.
    /// Groups own fresh instances of their steps, so a command used both on
    /// its own and inside a group is two independent commands that compete
    /// for the same resources.
    pub fn from_config(cfg: &ConfigFile, inputs: &InputTable, outputs: &OutputTable) -> Result<Self> {
        let period = cfg.control_loop.period();
        let mut scheduler = Scheduler::new();

        for name in cfg.resource.keys() {
            scheduler.add_resource(name.as_str())?;
        }

        for name in cfg.command.keys().chain(cfg.group.keys()) {
            let command = build_command(cfg, name, &scheduler, outputs, period)?;
            scheduler.add_command(command)?;
        }

        for (name, resource) in cfg.resource.iter() {
            if let Some(default) = &resource.default {
                let resource_id = lookup_resource(&scheduler, name)?;
                let command_id = lookup_command(&scheduler, default)?;
                scheduler.register_default(resource_id, command_id)?;
            }
        }

        for (name, binding) in cfg.binding.iter() {
            let target = lookup_command(&scheduler, &binding.command)?;
            match binding.threshold {
                Some(threshold) => scheduler.bind(
                    inputs.axis_beyond(&binding.input, threshold),
                    binding.mode,
                    target,
                )?,
                None => scheduler.bind(inputs.button(&binding.input), binding.mode, target)?,
            }
            debug!(binding = %name, input = %binding.input, command = %binding.command, "wired binding");
        }

        let autonomous = match &cfg.autonomous {
            Some(auto) => Some(lookup_command(&scheduler, &auto.command)?),
            None => None,
        };

        info!(
            resources = cfg.resource.len(),
            commands = scheduler.command_count(),
            bindings = scheduler.binding_count(),
            period_ms = period.as_millis() as u64,
            "robot wired"
        );

        Ok(Self {
            scheduler,
            autonomous,
            period,
        })
    }
}

/// Build a fresh instance of the command or group called `name`.
fn build_command(
    cfg: &ConfigFile,
    name: &str,
    scheduler: &Scheduler,
    outputs: &OutputTable,
    period: Duration,
) -> Result<Box<dyn Command>> {
    if let Some(command) = cfg.command.get(name) {
        let mut requirements = ResourceSet::new();
        for resource in &command.requires {
            requirements.insert(lookup_resource(scheduler, resource)?);
        }
        let scripted = ScriptedCommand::new(name, requirements, command.requires.clone(), outputs.clone())
            .with_output(command.output)
            .with_end_output(command.end_output)
            .finishing_after(command.finish_after);
        return Ok(Box::new(scripted));
    }

    let group = cfg
        .group
        .get(name)
        .ok_or_else(|| CmdloopError::UnknownCommand(name.to_string()))?;

    let mut builder = SequentialGroup::builder(name, period);
    for step in &group.steps {
        let child = build_command(cfg, &step.command, scheduler, outputs, period)?;
        builder = builder.then_boxed(child, step.timeout());
    }
    Ok(Box::new(builder.build()?))
}

fn lookup_resource(scheduler: &Scheduler, name: &str) -> Result<ResourceId> {
    scheduler
        .resource_id(name)
        .ok_or_else(|| CmdloopError::UnknownResource(name.to_string()))
}

fn lookup_command(scheduler: &Scheduler, name: &str) -> Result<CommandId> {
    scheduler
        .command_id(name)
        .ok_or_else(|| CmdloopError::UnknownCommand(name.to_string()))
}
