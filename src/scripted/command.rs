// src/scripted/command.rs

use tracing::{debug, trace};

use crate::command::{Command, HookResult};
use crate::resource::ResourceSet;
use crate::scripted::outputs::OutputTable;

/// A command whose behaviour comes from configuration.
///
/// While running it drives every required resource to `output`; when it
/// leaves `Running` (finished or interrupted) it writes `end_output`, the
/// "stop the actuator" value. With `finish_after = Some(n)` it finishes
/// after `n` steps, otherwise it runs until cancelled.
#[derive(Debug, Clone)]
pub struct ScriptedCommand {
    name: String,
    requirements: ResourceSet,
    targets: Vec<String>,
    output: f64,
    end_output: f64,
    finish_after: Option<u64>,
    steps: u64,
    outputs: OutputTable,
}

impl ScriptedCommand {
    /// `targets` are the names of the resources in `requirements`, used as
    /// keys in the output table.
    pub fn new(
        name: impl Into<String>,
        requirements: ResourceSet,
        targets: Vec<String>,
        outputs: OutputTable,
    ) -> Self {
        Self {
            name: name.into(),
            requirements,
            targets,
            output: 0.0,
            end_output: 0.0,
            finish_after: None,
            steps: 0,
            outputs,
        }
    }

    pub fn with_output(mut self, output: f64) -> Self {
        self.output = output;
        self
    }

    pub fn with_end_output(mut self, end_output: f64) -> Self {
        self.end_output = end_output;
        self
    }

    pub fn finishing_after(mut self, steps: Option<u64>) -> Self {
        self.finish_after = steps;
        self
    }

    /// Steps taken in the current activation.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Command for ScriptedCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> &ResourceSet {
        &self.requirements
    }

    fn on_start(&mut self) -> HookResult {
        self.steps = 0;
        debug!(command = %self.name, targets = ?self.targets, "scripted command started");
        Ok(())
    }

    fn on_step(&mut self) -> HookResult {
        self.steps += 1;
        for target in &self.targets {
            self.outputs.set(target, self.output);
        }
        trace!(command = %self.name, steps = self.steps, output = self.output, "scripted step");
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finish_after.is_some_and(|n| self.steps >= n)
    }

    fn on_end(&mut self, interrupted: bool) -> HookResult {
        for target in &self.targets {
            self.outputs.set(target, self.end_output);
        }
        debug!(
            command = %self.name,
            interrupted,
            steps = self.steps,
            "scripted command ended"
        );
        Ok(())
    }
}
