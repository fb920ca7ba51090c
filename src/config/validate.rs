// src/config/validate.rs

use std::collections::BTreeSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CmdloopError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CmdloopError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_resources(cfg)?;
    validate_loop(cfg)?;
    validate_names(cfg)?;
    validate_command_requirements(cfg)?;
    validate_group_steps(cfg)?;
    validate_group_nesting(cfg)?;
    validate_defaults(cfg)?;
    validate_bindings(cfg)?;
    validate_autonomous(cfg)?;
    validate_script(cfg)?;
    Ok(())
}

fn ensure_has_resources(cfg: &RawConfigFile) -> Result<()> {
    if cfg.resource.is_empty() {
        return Err(CmdloopError::ConfigError(
            "config must contain at least one [resource.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_loop(cfg: &RawConfigFile) -> Result<()> {
    if cfg.control_loop.period_ms == 0 {
        return Err(CmdloopError::ConfigError(
            "[loop].period_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.control_loop.max_ticks == Some(0) {
        return Err(CmdloopError::ConfigError(
            "[loop].max_ticks must be >= 1 when set (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_names(cfg: &RawConfigFile) -> Result<()> {
    if let Some(name) = cfg.command.keys().find(|n| cfg.group.contains_key(*n)) {
        return Err(CmdloopError::ConfigError(format!(
            "'{}' is defined both as [command.{}] and [group.{}]",
            name, name, name
        )));
    }
    Ok(())
}

fn validate_command_requirements(cfg: &RawConfigFile) -> Result<()> {
    for (name, command) in cfg.command.iter() {
        for resource in command.requires.iter() {
            if !cfg.resource.contains_key(resource) {
                return Err(CmdloopError::ConfigError(format!(
                    "command '{}' requires unknown resource '{}'",
                    name, resource
                )));
            }
        }
    }
    Ok(())
}

fn validate_group_steps(cfg: &RawConfigFile) -> Result<()> {
    for (name, group) in cfg.group.iter() {
        if group.steps.is_empty() {
            return Err(CmdloopError::ConfigError(format!(
                "group '{}' must contain at least one step",
                name
            )));
        }
        for step in group.steps.iter() {
            if !is_runnable(cfg, &step.command) {
                return Err(CmdloopError::ConfigError(format!(
                    "group '{}' has unknown step '{}'",
                    name, step.command
                )));
            }
        }
    }
    Ok(())
}

fn validate_group_nesting(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: child group -> parent group. A group that contains
    // itself (directly or through other groups) makes the sort fail.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.group.keys() {
        graph.add_node(name.as_str());
    }

    for (name, group) in cfg.group.iter() {
        for step in group.steps.iter() {
            if cfg.group.contains_key(&step.command) {
                graph.add_edge(step.command.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(CmdloopError::GroupCycle(format!(
                "group '{}' contains itself through nested steps",
                node
            )))
        }
    }
}

fn validate_defaults(cfg: &RawConfigFile) -> Result<()> {
    for (name, resource) in cfg.resource.iter() {
        let Some(default) = resource.default.as_deref() else {
            continue;
        };
        if !is_runnable(cfg, default) {
            return Err(CmdloopError::ConfigError(format!(
                "resource '{}' has unknown default command '{}'",
                name, default
            )));
        }
        let required = requirements_of(cfg, default);
        if required.len() != 1 || !required.contains(name.as_str()) {
            return Err(CmdloopError::ConfigError(format!(
                "default command '{}' for resource '{}' must require exactly that resource (requires {:?})",
                default, name, required
            )));
        }
    }
    Ok(())
}

fn validate_bindings(cfg: &RawConfigFile) -> Result<()> {
    for (name, binding) in cfg.binding.iter() {
        if !is_runnable(cfg, &binding.command) {
            return Err(CmdloopError::ConfigError(format!(
                "binding '{}' targets unknown command '{}'",
                name, binding.command
            )));
        }
        if binding.threshold.is_some_and(|t| t < 0.0) {
            return Err(CmdloopError::ConfigError(format!(
                "binding '{}' has a negative threshold",
                name
            )));
        }
    }
    Ok(())
}

fn validate_autonomous(cfg: &RawConfigFile) -> Result<()> {
    if let Some(auto) = &cfg.autonomous {
        if !is_runnable(cfg, &auto.command) {
            return Err(CmdloopError::ConfigError(format!(
                "[autonomous] names unknown command '{}'",
                auto.command
            )));
        }
    }
    Ok(())
}

fn validate_script(cfg: &RawConfigFile) -> Result<()> {
    if let Some(idx) = cfg.phase.iter().position(|p| p.ticks == 0) {
        return Err(CmdloopError::ConfigError(format!(
            "[[phase]] #{} must last at least one tick",
            idx + 1
        )));
    }
    for sample in cfg.input.iter() {
        if sample.from_tick >= sample.to_tick {
            return Err(CmdloopError::ConfigError(format!(
                "[[input]] '{}' has an empty tick range {}..{}",
                sample.name, sample.from_tick, sample.to_tick
            )));
        }
    }
    Ok(())
}

fn is_runnable(cfg: &RawConfigFile, name: &str) -> bool {
    cfg.command.contains_key(name) || cfg.group.contains_key(name)
}

/// Effective requirement set of a command or group (union over nested
/// steps). Only called once nesting is known to be acyclic.
fn requirements_of<'a>(cfg: &'a RawConfigFile, name: &str) -> BTreeSet<&'a str> {
    if let Some(command) = cfg.command.get(name) {
        return command.requires.iter().map(String::as_str).collect();
    }
    let mut set = BTreeSet::new();
    if let Some(group) = cfg.group.get(name) {
        for step in group.steps.iter() {
            set.extend(requirements_of(cfg, &step.command));
        }
    }
    set
}
