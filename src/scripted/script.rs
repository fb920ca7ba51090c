// src/scripted/script.rs

use serde::Deserialize;

use crate::trigger::InputTable;
use crate::types::OperatingMode;

/// One recorded operator input: `name` reads `value` for loop ticks in
/// `[from_tick, to_tick)` and `0.0` otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputSample {
    pub name: String,
    pub from_tick: u64,
    pub to_tick: u64,
    #[serde(default = "default_sample_value")]
    pub value: f64,
}

fn default_sample_value() -> f64 {
    1.0
}

/// Replays recorded inputs into an [`InputTable`].
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    samples: Vec<InputSample>,
}

impl InputScript {
    pub fn new(samples: Vec<InputSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[InputSample] {
        &self.samples
    }

    /// Write the input values for loop tick `tick` (0-based).
    ///
    /// Every scripted input is written each tick so that releases are seen.
    /// Overlapping samples for the same input: the last one listed wins.
    pub fn apply(&self, tick: u64, inputs: &InputTable) {
        for sample in &self.samples {
            if (sample.from_tick..sample.to_tick).contains(&tick) {
                inputs.set(&sample.name, sample.value);
            } else if !self.active_elsewhere(&sample.name, tick) {
                inputs.set(&sample.name, 0.0);
            }
        }
    }

    fn active_elsewhere(&self, name: &str, tick: u64) -> bool {
        self.samples
            .iter()
            .any(|s| s.name == name && (s.from_tick..s.to_tick).contains(&tick))
    }
}

/// A span of the match spent in one operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Phase {
    pub mode: OperatingMode,
    pub ticks: u64,
}

/// Ordered list of phases, e.g. autonomous for 750 ticks then teleop.
#[derive(Debug, Clone, Default)]
pub struct PhasePlan {
    phases: Vec<Phase>,
}

impl PhasePlan {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Saturates at `u64::MAX`.
    pub fn total_ticks(&self) -> u64 {
        self.phases
            .iter()
            .fold(0u64, |total, p| total.saturating_add(p.ticks))
    }

    /// Mode in effect at loop tick `tick` (0-based); `None` past the end.
    pub fn mode_at(&self, tick: u64) -> Option<OperatingMode> {
        let mut start: u64 = 0;
        for phase in &self.phases {
            let end = start.saturating_add(phase.ticks);
            if tick < end {
                return Some(phase.mode);
            }
            start = end;
        }
        None
    }
}
