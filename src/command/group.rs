// src/command/group.rs

//! Sequential composition of commands.
//!
//! A [`SequentialGroup`] presents an ordered list of child commands to the
//! scheduler as a single command. Its requirement set is the union of the
//! children's sets, computed once at construction, so the scheduler
//! arbitrates the whole group against conflicting single commands.
//!
//! Each child may carry a timeout that acts as a watchdog: elapsed time
//! advances by one loop period per group step, and once the budget is used
//! up the child is ended with `on_end(false)` at the beginning of the next
//! step and the sequence moves on.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use crate::command::{Command, HookResult};
use crate::errors::{CmdloopError, Result};
use crate::resource::ResourceSet;

/// One entry of a sequential group.
pub struct GroupStep {
    command: Box<dyn Command>,
    timeout: Option<Duration>,
}

impl GroupStep {
    pub fn name(&self) -> &str {
        self.command.name()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for GroupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupStep")
            .field("command", &self.command.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Composite command running its children one at a time.
#[derive(Debug)]
pub struct SequentialGroup {
    name: String,
    steps: Vec<GroupStep>,
    requirements: ResourceSet,
    period: Duration,
    /// Index of the active child; `steps.len()` once the sequence is done.
    index: usize,
    /// Time spent in the active child.
    elapsed: Duration,
}

impl SequentialGroup {
    pub fn builder(name: impl Into<String>, period: Duration) -> SequentialGroupBuilder {
        SequentialGroupBuilder::new(name, period)
    }

    pub fn steps(&self) -> &[GroupStep] {
        &self.steps
    }

    /// Index of the currently active child.
    pub fn active_index(&self) -> Option<usize> {
        (self.index < self.steps.len()).then_some(self.index)
    }

    fn start_active(&mut self) -> HookResult {
        self.elapsed = Duration::ZERO;
        let Some(step) = self.steps.get_mut(self.index) else {
            return Ok(());
        };
        debug!(group = %self.name, step = self.index, child = %step.command.name(), "starting group step");
        step.command
            .on_start()
            .with_context(|| format!("group '{}' step {} ('{}')", self.name, self.index, step.command.name()))
    }

    /// End the active child gracefully, then start the next one (if any).
    fn advance(&mut self) -> HookResult {
        if let Some(step) = self.steps.get_mut(self.index) {
            step.command
                .on_end(false)
                .with_context(|| format!("group '{}' step {} ('{}')", self.name, self.index, step.command.name()))?;
        }
        self.index += 1;
        self.start_active()
    }

    fn timed_out(&self) -> bool {
        match self.steps.get(self.index).and_then(|s| s.timeout) {
            Some(limit) => self.elapsed >= limit,
            None => false,
        }
    }
}

impl Command for SequentialGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> &ResourceSet {
        &self.requirements
    }

    fn on_start(&mut self) -> HookResult {
        self.index = 0;
        self.start_active()
    }

    fn on_step(&mut self) -> HookResult {
        // Watchdog: a child that used up its budget is ended before it gets
        // another step. Zero-length budgets may skip several children.
        while self.index < self.steps.len() && self.timed_out() {
            debug!(
                group = %self.name,
                step = self.index,
                elapsed_ms = self.elapsed.as_millis() as u64,
                "group step timed out"
            );
            self.advance()?;
        }

        let Some(step) = self.steps.get_mut(self.index) else {
            return Ok(());
        };

        step.command
            .on_step()
            .with_context(|| format!("group '{}' step {} ('{}')", self.name, self.index, step.command.name()))?;
        self.elapsed += self.period;

        if step.command.is_finished() {
            debug!(group = %self.name, step = self.index, "group step finished");
            self.advance()?;
        }

        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    fn on_end(&mut self, interrupted: bool) -> HookResult {
        // Children before the active one already ended; children after it
        // never started.
        if let Some(step) = self.steps.get_mut(self.index) {
            step.command
                .on_end(interrupted)
                .with_context(|| format!("group '{}' step {} ('{}')", self.name, self.index, step.command.name()))?;
        }
        self.index = self.steps.len();
        Ok(())
    }
}

/// Builder for [`SequentialGroup`].
pub struct SequentialGroupBuilder {
    name: String,
    period: Duration,
    steps: Vec<GroupStep>,
}

impl SequentialGroupBuilder {
    pub fn new(name: impl Into<String>, period: Duration) -> Self {
        Self {
            name: name.into(),
            period,
            steps: Vec::new(),
        }
    }

    /// Append a child that runs until it finishes on its own.
    pub fn then(self, command: impl Command + 'static) -> Self {
        self.then_boxed(Box::new(command), None)
    }

    /// Append a child bounded by `timeout`.
    pub fn then_with_timeout(self, command: impl Command + 'static, timeout: Duration) -> Self {
        self.then_boxed(Box::new(command), Some(timeout))
    }

    pub fn then_boxed(mut self, command: Box<dyn Command>, timeout: Option<Duration>) -> Self {
        self.steps.push(GroupStep { command, timeout });
        self
    }

    /// Finish construction, computing the requirement union.
    pub fn build(self) -> Result<SequentialGroup> {
        if self.steps.is_empty() {
            return Err(CmdloopError::ConfigError(format!(
                "group '{}' must contain at least one step",
                self.name
            )));
        }
        if self.period.is_zero() {
            return Err(CmdloopError::ConfigError(format!(
                "group '{}' needs a non-zero loop period",
                self.name
            )));
        }

        let requirements: ResourceSet = self
            .steps
            .iter()
            .flat_map(|s| s.command.requirements().iter().copied())
            .collect();

        let index = self.steps.len();

        Ok(SequentialGroup {
            name: self.name,
            steps: self.steps,
            requirements,
            period: self.period,
            index,
            elapsed: Duration::ZERO,
        })
    }
}
