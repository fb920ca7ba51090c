use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a binding reacts to edges of its input source.
///
/// - `OnPress`: start the target on the false -> true edge.
/// - `OnRelease`: start the target on the true -> false edge.
/// - `WhileHeld`: start on false -> true, cancel on true -> false. Cancelling
///   a command that already finished on its own is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMode {
    OnPress,
    OnRelease,
    WhileHeld,
}

impl FromStr for ActivationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on_press" | "press" => Ok(ActivationMode::OnPress),
            "on_release" | "release" => Ok(ActivationMode::OnRelease),
            "while_held" | "held" => Ok(ActivationMode::WhileHeld),
            other => Err(format!(
                "invalid binding mode: {other} (expected \"on_press\", \"on_release\" or \"while_held\")"
            )),
        }
    }
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivationMode::OnPress => "on_press",
            ActivationMode::OnRelease => "on_release",
            ActivationMode::WhileHeld => "while_held",
        };
        f.write_str(s)
    }
}

/// Operating mode of the machine, as reported by the control-loop driver.
///
/// - `Disabled`: everything is cancelled and the scheduler is not ticked.
/// - `Autonomous`: the configured autonomous command is started directly,
///   bypassing bindings.
/// - `Teleop`: operator bindings drive the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
}

impl FromStr for OperatingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" => Ok(OperatingMode::Disabled),
            "autonomous" | "auto" => Ok(OperatingMode::Autonomous),
            "teleop" => Ok(OperatingMode::Teleop),
            other => Err(format!(
                "invalid operating mode: {other} (expected \"disabled\", \"autonomous\" or \"teleop\")"
            )),
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatingMode::Disabled => "disabled",
            OperatingMode::Autonomous => "autonomous",
            OperatingMode::Teleop => "teleop",
        };
        f.write_str(s)
    }
}
