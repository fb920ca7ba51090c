// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod resource;
pub mod scheduler;
pub mod scripted;
pub mod trigger;
pub mod types;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, Wiring, load_and_validate};
use crate::engine::{CoreRuntime, LoopEvent, LoopOptions, Runtime};
use crate::scripted::{InputScript, OutputTable, PhasePlan};
use crate::trigger::InputTable;
use crate::types::OperatingMode;

pub use crate::command::{Command, CommandId, CommandState, SequentialGroup};
pub use crate::errors::CmdloopError;
pub use crate::resource::{ResourceId, ResourceSet};
pub use crate::scheduler::{Scheduler, TickReport};
pub use crate::trigger::{ActivationMode, InputSource};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - scheduler wiring (resources, commands, groups, bindings)
/// - core loop + async driver
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        write_dry_run(&cfg, &mut io::stdout().lock())?;
        return Ok(());
    }

    let inputs = InputTable::new();
    let outputs = OutputTable::new();
    let wiring = Wiring::from_config(&cfg, &inputs, &outputs)?;
    let options = LoopOptions {
        period: wiring.period,
        fast: args.fast,
    };

    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>(16);

    // Ctrl-C → graceful shutdown.
    {
        let tx = loop_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(LoopEvent::ShutdownRequested).await;
        });
    }

    // Without a match plan the robot is simply enabled in teleop.
    if cfg.phase.is_empty() {
        info!("no [[phase]] entries; enabling teleop until stopped");
        loop_tx
            .send(LoopEvent::ModeChanged(OperatingMode::Teleop))
            .await?;
    }

    let max_ticks = args.max_ticks.or(cfg.control_loop.max_ticks);
    let core = CoreRuntime::new(
        wiring,
        inputs,
        InputScript::new(cfg.input.clone()),
        PhasePlan::new(cfg.phase.clone()),
        max_ticks,
    );

    let runtime = Runtime::new(core, loop_rx, options);
    let stats = runtime.run().await?;

    println!(
        "ticks: {} (scheduler {}), overruns: {}",
        stats.loop_ticks, stats.scheduler_ticks, stats.overruns
    );
    for (resource, value) in outputs.snapshot() {
        println!("  {resource} = {value}");
    }
    Ok(())
}

/// Dry-run report: resources, commands, groups, bindings and the phase
/// plan. Nothing is wired or ticked.
pub fn write_dry_run(cfg: &ConfigFile, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "cmdloop dry-run")?;
    writeln!(out, "  loop.period_ms = {}", cfg.control_loop.period_ms)?;
    if let Some(max) = cfg.control_loop.max_ticks {
        writeln!(out, "  loop.max_ticks = {max}")?;
    }
    writeln!(out)?;

    writeln!(out, "resources ({}):", cfg.resource.len())?;
    for (name, resource) in cfg.resource.iter() {
        match &resource.default {
            Some(default) => writeln!(out, "  - {name} (default: {default})")?,
            None => writeln!(out, "  - {name}")?,
        }
    }

    writeln!(out, "commands ({}):", cfg.command.len())?;
    for (name, command) in cfg.command.iter() {
        writeln!(out, "  - {name}")?;
        if !command.requires.is_empty() {
            writeln!(out, "      requires: {:?}", command.requires)?;
        }
        writeln!(out, "      output: {} (end: {})", command.output, command.end_output)?;
        if let Some(steps) = command.finish_after {
            writeln!(out, "      finish_after: {steps}")?;
        }
    }

    writeln!(out, "groups ({}):", cfg.group.len())?;
    for (name, group) in cfg.group.iter() {
        writeln!(out, "  - {name}")?;
        for step in &group.steps {
            match step.timeout_ms {
                Some(ms) => writeln!(out, "      then {} (timeout {ms} ms)", step.command)?,
                None => writeln!(out, "      then {}", step.command)?,
            }
        }
    }

    writeln!(out, "bindings ({}):", cfg.binding.len())?;
    for (name, binding) in cfg.binding.iter() {
        match binding.threshold {
            Some(t) => writeln!(
                out,
                "  - {name}: |{}| > {t} {} {}",
                binding.input, binding.mode, binding.command
            )?,
            None => writeln!(
                out,
                "  - {name}: {} {} {}",
                binding.input, binding.mode, binding.command
            )?,
        }
    }

    if let Some(auto) = &cfg.autonomous {
        writeln!(out, "autonomous: {}", auto.command)?;
    }

    if !cfg.phase.is_empty() {
        writeln!(out, "phases:")?;
        for phase in &cfg.phase {
            writeln!(out, "  - {} for {} ticks", phase.mode, phase.ticks)?;
        }
    }
    if !cfg.input.is_empty() {
        writeln!(out, "scripted inputs: {}", cfg.input.len())?;
    }

    debug!("dry-run complete (nothing ticked)");
    Ok(())
}
