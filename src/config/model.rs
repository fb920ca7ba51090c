// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::scripted::{InputSample, Phase};
use crate::types::ActivationMode;

/// Top-level robot description as read from a TOML file.
///
/// ```toml
/// [loop]
/// period_ms = 20
///
/// [resource.climber]
/// default = "hold_winch"
///
/// [command.hold_winch]
/// requires = ["climber"]
///
/// [command.raise_winch]
/// requires = ["climber"]
/// output = 1.0
///
/// [binding.winch_button]
/// input = "dpad_left"
/// mode = "while_held"
/// command = "raise_winch"
///
/// [[phase]]
/// mode = "teleop"
/// ticks = 500
/// ```
///
/// All sections are optional at the TOML level; [`ConfigFile::try_from`]
/// enforces the semantic rules.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Control loop settings from `[loop]`.
    #[serde(default, rename = "loop")]
    pub control_loop: LoopSection,

    /// Resources from `[resource.<name>]`.
    #[serde(default)]
    pub resource: BTreeMap<String, ResourceConfig>,

    /// Scripted commands from `[command.<name>]`.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,

    /// Sequential groups from `[group.<name>]`.
    #[serde(default)]
    pub group: BTreeMap<String, GroupConfig>,

    /// Input bindings from `[binding.<name>]`.
    #[serde(default)]
    pub binding: BTreeMap<String, BindingConfig>,

    /// Command started when the autonomous phase begins.
    #[serde(default)]
    pub autonomous: Option<AutonomousSection>,

    /// Match phases from `[[phase]]`, in order.
    #[serde(default)]
    pub phase: Vec<Phase>,

    /// Recorded operator inputs from `[[input]]`.
    #[serde(default)]
    pub input: Vec<InputSample>,
}

/// A validated robot description.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (or the loader), so
/// holders can rely on every reference resolving.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub control_loop: LoopSection,
    pub resource: BTreeMap<String, ResourceConfig>,
    pub command: BTreeMap<String, CommandConfig>,
    pub group: BTreeMap<String, GroupConfig>,
    pub binding: BTreeMap<String, BindingConfig>,
    pub autonomous: Option<AutonomousSection>,
    pub phase: Vec<Phase>,
    pub input: Vec<InputSample>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            control_loop: raw.control_loop,
            resource: raw.resource,
            command: raw.command,
            group: raw.group,
            binding: raw.binding,
            autonomous: raw.autonomous,
            phase: raw.phase,
            input: raw.input,
        }
    }

    /// Whether `name` refers to a command or a group.
    pub fn is_runnable(&self, name: &str) -> bool {
        self.command.contains_key(name) || self.group.contains_key(name)
    }
}

/// `[loop]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoopSection {
    /// Control period in milliseconds (default 20).
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Optional cap on the number of loop ticks the simulator runs.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_period_ms() -> u64 {
    20
}

impl Default for LoopSection {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            max_ticks: None,
        }
    }
}

impl LoopSection {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// `[resource.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceConfig {
    /// Command (or group) started whenever the resource is idle. It must
    /// require exactly this resource.
    #[serde(default)]
    pub default: Option<String>,
}

/// `[command.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandConfig {
    /// Names of the resources this command needs exclusively.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Output written to every required resource on each step.
    #[serde(default)]
    pub output: f64,

    /// Output written when the command ends, finished or interrupted.
    #[serde(default)]
    pub end_output: f64,

    /// Finish naturally after this many steps; run until cancelled if absent.
    #[serde(default)]
    pub finish_after: Option<u64>,
}

/// `[group.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupConfig {
    pub steps: Vec<GroupStepConfig>,
}

/// One entry of `steps = [...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupStepConfig {
    /// Command or group to run.
    pub command: String,

    /// Watchdog for this step.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl GroupStepConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// `[binding.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingConfig {
    /// Name of the input in the input table.
    pub input: String,

    pub mode: ActivationMode,

    /// Command or group to start / cancel.
    pub command: String,

    /// Analog threshold: active while `|value| > threshold`. Without it the
    /// input is active while non-zero.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// `[autonomous]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AutonomousSection {
    pub command: String,
}
