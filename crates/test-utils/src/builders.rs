#![allow(dead_code)]

use std::collections::BTreeMap;

use cmdloop::config::{
    AutonomousSection, BindingConfig, CommandConfig, ConfigFile, GroupConfig, GroupStepConfig,
    LoopSection, RawConfigFile, ResourceConfig,
};
use cmdloop::scripted::{InputSample, Phase};
use cmdloop::types::{ActivationMode, OperatingMode};

/// Builder for robot descriptions to simplify test setup.
pub struct RobotConfigBuilder {
    config: RawConfigFile,
}

impl RobotConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                control_loop: LoopSection::default(),
                resource: BTreeMap::new(),
                command: BTreeMap::new(),
                group: BTreeMap::new(),
                binding: BTreeMap::new(),
                autonomous: None,
                phase: vec![],
                input: vec![],
            },
        }
    }

    pub fn period_ms(mut self, ms: u64) -> Self {
        self.config.control_loop.period_ms = ms;
        self
    }

    pub fn max_ticks(mut self, ticks: u64) -> Self {
        self.config.control_loop.max_ticks = Some(ticks);
        self
    }

    pub fn resource(mut self, name: &str) -> Self {
        self.config
            .resource
            .insert(name.to_string(), ResourceConfig::default());
        self
    }

    pub fn resource_with_default(mut self, name: &str, default: &str) -> Self {
        self.config.resource.insert(
            name.to_string(),
            ResourceConfig {
                default: Some(default.to_string()),
            },
        );
        self
    }

    pub fn command(mut self, name: &str, command: CommandConfig) -> Self {
        self.config.command.insert(name.to_string(), command);
        self
    }

    /// Each step is `(command, timeout_ms)`.
    pub fn group(mut self, name: &str, steps: &[(&str, Option<u64>)]) -> Self {
        let steps = steps
            .iter()
            .map(|(command, timeout_ms)| GroupStepConfig {
                command: command.to_string(),
                timeout_ms: *timeout_ms,
            })
            .collect();
        self.config
            .group
            .insert(name.to_string(), GroupConfig { steps });
        self
    }

    pub fn binding(mut self, name: &str, input: &str, mode: ActivationMode, command: &str) -> Self {
        self.config.binding.insert(
            name.to_string(),
            BindingConfig {
                input: input.to_string(),
                mode,
                command: command.to_string(),
                threshold: None,
            },
        );
        self
    }

    pub fn axis_binding(
        mut self,
        name: &str,
        input: &str,
        threshold: f64,
        mode: ActivationMode,
        command: &str,
    ) -> Self {
        self.config.binding.insert(
            name.to_string(),
            BindingConfig {
                input: input.to_string(),
                mode,
                command: command.to_string(),
                threshold: Some(threshold),
            },
        );
        self
    }

    pub fn autonomous(mut self, command: &str) -> Self {
        self.config.autonomous = Some(AutonomousSection {
            command: command.to_string(),
        });
        self
    }

    pub fn phase(mut self, mode: OperatingMode, ticks: u64) -> Self {
        self.config.phase.push(Phase { mode, ticks });
        self
    }

    pub fn input(mut self, name: &str, from_tick: u64, to_tick: u64, value: f64) -> Self {
        self.config.input.push(InputSample {
            name: name.to_string(),
            from_tick,
            to_tick,
            value,
        });
        self
    }

    /// The unvalidated description, for exercising validation errors.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for RobotConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandConfig`.
pub struct CommandConfigBuilder {
    command: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new() -> Self {
        Self {
            command: CommandConfig::default(),
        }
    }

    pub fn requires(mut self, resource: &str) -> Self {
        self.command.requires.push(resource.to_string());
        self
    }

    pub fn output(mut self, value: f64) -> Self {
        self.command.output = value;
        self
    }

    pub fn end_output(mut self, value: f64) -> Self {
        self.command.end_output = value;
        self
    }

    pub fn finish_after(mut self, steps: u64) -> Self {
        self.command.finish_after = Some(steps);
        self
    }

    pub fn build(self) -> CommandConfig {
        self.command
    }
}

impl Default for CommandConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
