// src/engine/runtime.rs

use std::fmt;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::Result;

use super::core::CoreRuntime;
use super::{LoopEvent, LoopOptions, LoopStats};

/// Drives the core at a fixed period and feeds it control events.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// loop semantics. Control events (mode changes, shutdown) are drained from
/// `event_rx` before each tick; they never interrupt a tick in progress.
pub struct Runtime {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<LoopEvent>,
    options: LoopOptions,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<LoopEvent>, options: LoopOptions) -> Self {
        Self {
            core,
            event_rx,
            options,
        }
    }

    /// Main loop.
    ///
    /// - Drains pending control events into the core.
    /// - Waits for the next period (unless running in fast mode).
    /// - Ticks the core and checks the tick against its time budget.
    pub async fn run(mut self) -> Result<LoopStats> {
        info!(
            period_ms = self.options.period.as_millis() as u64,
            fast = self.options.fast,
            "control loop started"
        );

        let mut interval = time::interval(self.options.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = LoopStats::default();

        'control: loop {
            while let Ok(event) = self.event_rx.try_recv() {
                debug!(?event, "control loop received event");
                if !self.core.step(event)?.keep_running {
                    break 'control;
                }
            }

            if self.options.fast {
                tokio::task::yield_now().await;
            } else {
                interval.tick().await;
            }

            let started = Instant::now();
            let step = self.core.step(LoopEvent::Tick)?;
            let elapsed = started.elapsed();

            if !step.keep_running {
                break;
            }

            stats.loop_ticks += 1;
            if elapsed > self.options.period {
                stats.overruns += 1;
                warn!(
                    loop_tick = self.core.loop_tick(),
                    elapsed_us = elapsed.as_micros() as u64,
                    period_us = self.options.period.as_micros() as u64,
                    "tick overran its period"
                );
            }
        }

        stats.scheduler_ticks = self.core.scheduler().tick_count();
        info!(
            loop_ticks = stats.loop_ticks,
            scheduler_ticks = stats.scheduler_ticks,
            overruns = stats.overruns,
            "control loop exiting"
        );
        Ok(stats)
    }
}
