// tests/engine_core.rs

mod common;
use crate::common::builders::{CommandConfigBuilder, RobotConfigBuilder};
use crate::common::init_tracing;

use std::error::Error;

use cmdloop::config::{ConfigFile, Wiring};
use cmdloop::engine::{CoreRuntime, LoopEvent};
use cmdloop::scripted::{InputScript, OutputTable, PhasePlan};
use cmdloop::trigger::InputTable;
use cmdloop::types::{ActivationMode, OperatingMode};

type TestResult = Result<(), Box<dyn Error>>;

/// Drive with a default, an autonomous routine, and an intake on a button.
fn match_config() -> ConfigFile {
    RobotConfigBuilder::new()
        .resource_with_default("drive", "arcade")
        .resource("intake")
        .command(
            "arcade",
            CommandConfigBuilder::new().requires("drive").output(0.25).build(),
        )
        .command(
            "drive_out",
            CommandConfigBuilder::new().requires("drive").output(0.6).build(),
        )
        .command(
            "grab",
            CommandConfigBuilder::new().requires("intake").output(1.0).build(),
        )
        .binding("grab_button", "a", ActivationMode::WhileHeld, "grab")
        .autonomous("drive_out")
        .phase(OperatingMode::Disabled, 2)
        .phase(OperatingMode::Autonomous, 5)
        .phase(OperatingMode::Teleop, 5)
        .input("a", 8, 10, 1.0)
        .build()
}

fn core_for(cfg: &ConfigFile, outputs: &OutputTable, max_ticks: Option<u64>) -> CoreRuntime {
    let inputs = InputTable::new();
    let wiring = Wiring::from_config(cfg, &inputs, outputs).unwrap();
    CoreRuntime::new(
        wiring,
        inputs,
        InputScript::new(cfg.input.clone()),
        PhasePlan::new(cfg.phase.clone()),
        max_ticks,
    )
}

#[test]
fn phase_plan_drives_modes_and_autonomous_command() -> TestResult {
    init_tracing();
    let cfg = match_config();
    let outputs = OutputTable::new();
    let mut core = core_for(&cfg, &outputs, None);
    let drive_out = core.scheduler().command_id("drive_out").unwrap();
    let arcade = core.scheduler().command_id("arcade").unwrap();
    let grab = core.scheduler().command_id("grab").unwrap();

    // Disabled: nothing ticks.
    for _ in 0..2 {
        let step = core.step(LoopEvent::Tick)?;
        assert!(step.keep_running);
        assert!(step.report.is_none());
    }
    assert_eq!(core.scheduler().tick_count(), 0);

    // Autonomous: the routine is started directly and holds the drive.
    let step = core.step(LoopEvent::Tick)?;
    assert_eq!(core.mode(), OperatingMode::Autonomous);
    assert_eq!(step.report.map(|r| r.started), Some(vec![drive_out]));
    assert_eq!(outputs.get("drive"), Some(0.6));
    for _ in 0..4 {
        core.step(LoopEvent::Tick)?;
    }
    assert!(core.scheduler().is_running(drive_out));

    // Teleop: the routine is cancelled and the default takes over.
    core.step(LoopEvent::Tick)?;
    assert_eq!(core.mode(), OperatingMode::Teleop);
    assert!(!core.scheduler().is_running(drive_out));
    assert!(core.scheduler().is_running(arcade));

    // Scripted button held for loop ticks 8 and 9.
    core.step(LoopEvent::Tick)?;
    core.step(LoopEvent::Tick)?;
    assert!(core.scheduler().is_running(grab));
    assert_eq!(outputs.get("intake"), Some(1.0));
    core.step(LoopEvent::Tick)?;
    assert!(!core.scheduler().is_running(grab));

    assert!(core.step(LoopEvent::Tick)?.keep_running);
    assert_eq!(core.loop_tick(), 12);

    // Plan exhausted: everything is cancelled and the loop stops.
    let step = core.step(LoopEvent::Tick)?;
    assert!(!step.keep_running);
    assert!(core.scheduler().running_commands().is_empty());
    assert_eq!(core.scheduler().tick_count(), 10);
    Ok(())
}

#[test]
fn disabling_cancels_everything() -> TestResult {
    init_tracing();
    let cfg = RobotConfigBuilder::new()
        .resource_with_default("drive", "arcade")
        .command(
            "arcade",
            CommandConfigBuilder::new().requires("drive").output(0.5).end_output(0.0).build(),
        )
        .build();
    let outputs = OutputTable::new();
    let mut core = core_for(&cfg, &outputs, None);

    core.step(LoopEvent::ModeChanged(OperatingMode::Teleop))?;
    core.step(LoopEvent::Tick)?;
    core.step(LoopEvent::Tick)?;
    assert_eq!(outputs.get("drive"), Some(0.5));

    core.step(LoopEvent::ModeChanged(OperatingMode::Disabled))?;
    assert!(core.scheduler().running_commands().is_empty());
    assert_eq!(outputs.get("drive"), Some(0.0));

    // Suspended while disabled: the default is not re-armed.
    let step = core.step(LoopEvent::Tick)?;
    assert!(step.keep_running);
    assert!(step.report.is_none());
    assert!(core.scheduler().running_commands().is_empty());
    Ok(())
}

#[test]
fn tick_limit_stops_the_loop() -> TestResult {
    init_tracing();
    let cfg = RobotConfigBuilder::new()
        .resource("drive")
        .command("idle", CommandConfigBuilder::new().requires("drive").build())
        .build();
    let outputs = OutputTable::new();
    let mut core = core_for(&cfg, &outputs, Some(3));
    core.step(LoopEvent::ModeChanged(OperatingMode::Teleop))?;

    let mut ticks = 0;
    while core.step(LoopEvent::Tick)?.keep_running {
        ticks += 1;
    }
    assert_eq!(ticks, 3);
    assert_eq!(core.scheduler().tick_count(), 3);
    Ok(())
}

#[test]
fn shutdown_request_cancels_and_stops() -> TestResult {
    init_tracing();
    let cfg = RobotConfigBuilder::new()
        .resource_with_default("arm", "hold")
        .command(
            "hold",
            CommandConfigBuilder::new().requires("arm").output(0.2).end_output(-1.0).build(),
        )
        .build();
    let outputs = OutputTable::new();
    let mut core = core_for(&cfg, &outputs, None);
    core.step(LoopEvent::ModeChanged(OperatingMode::Teleop))?;
    core.step(LoopEvent::Tick)?;

    let step = core.step(LoopEvent::ShutdownRequested)?;
    assert!(!step.keep_running);
    assert_eq!(outputs.get("arm"), Some(-1.0));
    Ok(())
}

#[test]
fn button_held_through_disable_restarts_its_command() -> TestResult {
    init_tracing();
    let cfg = RobotConfigBuilder::new()
        .resource("intake")
        .command(
            "grab",
            CommandConfigBuilder::new().requires("intake").output(1.0).build(),
        )
        .binding("grab_button", "a", ActivationMode::WhileHeld, "grab")
        .input("a", 0, 100, 1.0)
        .build();
    let outputs = OutputTable::new();
    let mut core = core_for(&cfg, &outputs, None);
    let grab = core.scheduler().command_id("grab").unwrap();

    core.step(LoopEvent::ModeChanged(OperatingMode::Teleop))?;
    core.step(LoopEvent::Tick)?;
    assert!(core.scheduler().is_running(grab));

    core.step(LoopEvent::ModeChanged(OperatingMode::Disabled))?;
    core.step(LoopEvent::Tick)?;
    assert!(!core.scheduler().is_running(grab));

    // Still held when re-enabled: the press fires again.
    core.step(LoopEvent::ModeChanged(OperatingMode::Teleop))?;
    let step = core.step(LoopEvent::Tick)?;
    assert!(core.scheduler().is_running(grab));
    assert_eq!(step.report.map(|r| r.started), Some(vec![grab]));
    Ok(())
}
