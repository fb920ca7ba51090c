// src/engine/core.rs

//! Pure core loop state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`LoopEvent`]s and:
//! - applies operating-mode transitions to the scheduler
//! - replays scripted inputs for the current loop tick
//! - ticks the scheduler while enabled
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for timing,
//! reading control events from a channel and handling Ctrl+C.
//!
//! The core is intended to be unit tested without any Tokio, channels or
//! timers.

use tracing::{debug, info};

use crate::command::CommandId;
use crate::config::Wiring;
use crate::engine::LoopEvent;
use crate::errors::Result;
use crate::scheduler::{Scheduler, TickReport};
use crate::scripted::{InputScript, PhasePlan};
use crate::trigger::InputTable;
use crate::types::OperatingMode;

/// Decision returned by the core after handling a single [`LoopEvent`].
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
    /// Scheduler report, if the scheduler was ticked.
    pub report: Option<TickReport>,
}

impl CoreStep {
    fn running(report: Option<TickReport>) -> Self {
        Self {
            keep_running: true,
            report,
        }
    }

    fn stop() -> Self {
        Self {
            keep_running: false,
            report: None,
        }
    }
}

/// Pure core loop state.
///
/// It has **no** channels, no Tokio types, and does not sleep.
///
/// While disabled the scheduler is not ticked, so bindings are not polled.
/// Leaving `Disabled` resets their edge state: an input held through the
/// disabled span fires its press edge on the first enabled tick.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    autonomous: Option<CommandId>,
    inputs: InputTable,
    script: InputScript,
    plan: PhasePlan,
    mode: OperatingMode,
    /// Loop periods processed so far; indexes the script and the plan.
    loop_tick: u64,
    max_ticks: Option<u64>,
}

impl CoreRuntime {
    /// Starts in [`OperatingMode::Disabled`].
    ///
    /// With a non-empty `plan` the mode follows the plan and the loop stops
    /// when the plan ends; otherwise the mode only changes through
    /// [`LoopEvent::ModeChanged`].
    pub fn new(
        wiring: Wiring,
        inputs: InputTable,
        script: InputScript,
        plan: PhasePlan,
        max_ticks: Option<u64>,
    ) -> Self {
        Self {
            scheduler: wiring.scheduler,
            autonomous: wiring.autonomous,
            inputs,
            script,
            plan,
            mode: OperatingMode::Disabled,
            loop_tick: 0,
            max_ticks,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn loop_tick(&self) -> u64 {
        self.loop_tick
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle a single event, updating core state.
    ///
    /// Hook failures surfaced by the scheduler are returned unchanged; the
    /// caller must treat them as fatal.
    pub fn step(&mut self, event: LoopEvent) -> Result<CoreStep> {
        match event {
            LoopEvent::Tick => self.handle_tick(),
            LoopEvent::ModeChanged(mode) => {
                self.enter_mode(mode)?;
                Ok(CoreStep::running(None))
            }
            LoopEvent::ShutdownRequested => {
                info!("shutdown requested; cancelling running commands");
                self.scheduler.cancel_all()?;
                Ok(CoreStep::stop())
            }
        }
    }

    fn handle_tick(&mut self) -> Result<CoreStep> {
        if self.max_ticks.is_some_and(|max| self.loop_tick >= max) {
            info!(loop_tick = self.loop_tick, "tick limit reached");
            self.scheduler.cancel_all()?;
            return Ok(CoreStep::stop());
        }

        if !self.plan.phases().is_empty() {
            match self.plan.mode_at(self.loop_tick) {
                Some(mode) => self.enter_mode(mode)?,
                None => {
                    info!(loop_tick = self.loop_tick, "match plan finished");
                    self.scheduler.cancel_all()?;
                    return Ok(CoreStep::stop());
                }
            }
        }

        let tick = self.loop_tick;
        self.loop_tick += 1;

        if self.mode == OperatingMode::Disabled {
            debug!(loop_tick = tick, "disabled; scheduler suspended");
            return Ok(CoreStep::running(None));
        }

        self.script.apply(tick, &self.inputs);
        let report = self.scheduler.tick()?;
        if !report.is_quiet() {
            debug!(
                loop_tick = tick,
                started = ?report.started,
                finished = ?report.finished,
                interrupted = ?report.interrupted,
                "scheduler transitions"
            );
        }
        Ok(CoreStep::running(Some(report)))
    }

    fn enter_mode(&mut self, mode: OperatingMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }

        let previous = self.mode;
        self.mode = mode;
        info!(from = %previous, to = %mode, loop_tick = self.loop_tick, "operating mode changed");

        // Bindings were not polled while disabled.
        if previous == OperatingMode::Disabled {
            self.scheduler.reset_bindings();
        }

        match mode {
            OperatingMode::Disabled => self.scheduler.cancel_all()?,
            OperatingMode::Autonomous => {
                if let Some(auto) = self.autonomous {
                    self.scheduler.start(auto)?;
                }
            }
            OperatingMode::Teleop => {
                if previous == OperatingMode::Autonomous {
                    if let Some(auto) = self.autonomous {
                        self.scheduler.cancel(auto)?;
                    }
                }
            }
        }
        Ok(())
    }
}
