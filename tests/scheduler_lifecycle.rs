// tests/scheduler_lifecycle.rs

mod common;
use crate::common::{init_tracing, set};

use std::error::Error;

use cmdloop::command::{CommandState, Hook};
use cmdloop::errors::CmdloopError;
use cmdloop::scheduler::Scheduler;
use cmdloop_test_utils::{EventLog, HookEvent, RecordingCommand};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn start_runs_on_start_immediately_and_acquires_resources() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let drive = scheduler.add_resource("drive")?;
    let arcade = scheduler.add_command(RecordingCommand::new("arcade", set(&[drive]), &log))?;

    assert_eq!(scheduler.state_of(arcade), Some(CommandState::Idle));
    scheduler.start(arcade)?;

    assert_eq!(log.events(), vec![HookEvent::start("arcade")]);
    assert_eq!(scheduler.state_of(arcade), Some(CommandState::Running));
    assert_eq!(scheduler.holder_of(drive), Some(arcade));
    assert_eq!(scheduler.running_commands(), vec![arcade]);
    Ok(())
}

#[test]
fn conflicting_start_interrupts_holder_before_new_on_start() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let shooter = scheduler.add_resource("shooter")?;
    let hopper = scheduler.add_resource("hopper")?;

    let feed = scheduler.add_command(RecordingCommand::new("feed", set(&[shooter, hopper]), &log))?;
    let spin_up = scheduler.add_command(RecordingCommand::new("spin_up", set(&[shooter]), &log))?;

    scheduler.start(feed)?;
    scheduler.start(spin_up)?;

    assert_eq!(
        log.events(),
        vec![
            HookEvent::start("feed"),
            HookEvent::end("feed", true),
            HookEvent::start("spin_up"),
        ]
    );
    assert_eq!(scheduler.holder_of(shooter), Some(spin_up));
    // An interrupted command releases everything, not just the contested resource.
    assert_eq!(scheduler.holder_of(hopper), None);
    assert!(!scheduler.is_running(feed));
    Ok(())
}

#[test]
fn starting_a_running_command_restarts_it() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let arm = scheduler.add_resource("arm")?;
    let raise = scheduler.add_command(RecordingCommand::new("raise", set(&[arm]), &log))?;

    scheduler.start(raise)?;
    scheduler.start(raise)?;

    assert_eq!(
        log.events(),
        vec![
            HookEvent::start("raise"),
            HookEvent::end("raise", true),
            HookEvent::start("raise"),
        ]
    );
    assert!(scheduler.is_running(raise));
    assert_eq!(scheduler.holder_of(arm), Some(raise));
    Ok(())
}

#[test]
fn cancel_of_idle_command_is_a_noop() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let arm = scheduler.add_resource("arm")?;
    let raise = scheduler.add_command(RecordingCommand::new("raise", set(&[arm]), &log))?;

    scheduler.cancel(raise)?;
    assert!(log.events().is_empty());

    scheduler.start(raise)?;
    scheduler.cancel(raise)?;
    scheduler.cancel(raise)?;

    assert_eq!(log.ends("raise"), 1);
    assert_eq!(log.for_command("raise").last(), Some(&HookEvent::end("raise", true)));
    assert_eq!(scheduler.holder_of(arm), None);
    Ok(())
}

#[test]
fn tick_steps_then_retires_finished_commands_in_the_same_tick() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let intake = scheduler.add_resource("intake")?;
    let pulse = scheduler.add_command(
        RecordingCommand::new("pulse", set(&[intake]), &log).finishing_after(2),
    )?;

    scheduler.start(pulse)?;

    let first = scheduler.tick()?;
    assert_eq!(first.tick, 1);
    assert_eq!(first.started, vec![pulse]);
    assert!(first.finished.is_empty());
    assert!(scheduler.is_running(pulse));

    let second = scheduler.tick()?;
    assert_eq!(second.finished, vec![pulse]);
    assert!(second.interrupted.is_empty());
    assert!(!scheduler.is_running(pulse));
    assert_eq!(scheduler.holder_of(intake), None);

    assert_eq!(
        log.events(),
        vec![
            HookEvent::start("pulse"),
            HookEvent::step("pulse"),
            HookEvent::step("pulse"),
            HookEvent::end("pulse", false),
        ]
    );

    let third = scheduler.tick()?;
    assert!(third.is_quiet());
    assert_eq!(scheduler.tick_count(), 3);
    Ok(())
}

#[test]
fn running_commands_are_stepped_in_start_order() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let left = scheduler.add_resource("left")?;
    let right = scheduler.add_resource("right")?;
    let a = scheduler.add_command(RecordingCommand::new("a", set(&[left]), &log))?;
    let b = scheduler.add_command(RecordingCommand::new("b", set(&[right]), &log))?;

    scheduler.start(b)?;
    scheduler.start(a)?;
    log.take();

    scheduler.tick()?;
    assert_eq!(log.take(), vec![HookEvent::step("b"), HookEvent::step("a")]);
    assert_eq!(scheduler.running_commands(), vec![b, a]);
    Ok(())
}

#[test]
fn cancel_all_interrupts_every_running_command() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let left = scheduler.add_resource("left")?;
    let right = scheduler.add_resource("right")?;
    let a = scheduler.add_command(RecordingCommand::new("a", set(&[left]), &log))?;
    let b = scheduler.add_command(RecordingCommand::new("b", set(&[right]), &log))?;

    scheduler.start(a)?;
    scheduler.start(b)?;
    scheduler.cancel_all()?;

    assert!(scheduler.running_commands().is_empty());
    assert_eq!(log.ends("a"), 1);
    assert_eq!(log.ends("b"), 1);
    assert_eq!(scheduler.holder_of(left), None);
    assert_eq!(scheduler.holder_of(right), None);
    Ok(())
}

#[test]
fn register_default_rejects_bad_wiring() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let drive = scheduler.add_resource("drive")?;
    let arm = scheduler.add_resource("arm")?;

    let hold = scheduler.add_command(RecordingCommand::new("hold", set(&[drive]), &log))?;
    let other_hold = scheduler.add_command(RecordingCommand::new("other_hold", set(&[drive]), &log))?;
    let both = scheduler.add_command(RecordingCommand::new("both", set(&[drive, arm]), &log))?;
    let nothing = scheduler.add_command(RecordingCommand::new("nothing", set(&[]), &log))?;

    match scheduler.register_default(arm, hold) {
        Err(CmdloopError::ConfigError(msg)) => assert!(msg.contains("must require exactly")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert!(matches!(
        scheduler.register_default(drive, both),
        Err(CmdloopError::ConfigError(_))
    ));
    assert!(matches!(
        scheduler.register_default(drive, nothing),
        Err(CmdloopError::ConfigError(_))
    ));

    scheduler.register_default(drive, hold)?;
    match scheduler.register_default(drive, other_hold) {
        Err(CmdloopError::ConfigError(msg)) => assert!(msg.contains("already has default")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(scheduler.resource(drive).and_then(|r| r.default_command()), Some(hold));
    Ok(())
}

#[test]
fn duplicate_and_dangling_registrations_are_rejected() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let drive = scheduler.add_resource("drive")?;
    assert!(matches!(
        scheduler.add_resource("drive"),
        Err(CmdloopError::ConfigError(_))
    ));

    scheduler.add_command(RecordingCommand::new("arcade", set(&[drive]), &log))?;
    assert!(matches!(
        scheduler.add_command(RecordingCommand::new("arcade", set(&[drive]), &log)),
        Err(CmdloopError::ConfigError(_))
    ));

    // A handle from another scheduler that does not exist here.
    let mut bigger = Scheduler::new();
    bigger.add_resource("a")?;
    let foreign = bigger.add_resource("b")?;
    assert!(matches!(
        scheduler.add_command(RecordingCommand::new("ghost", set(&[foreign]), &log)),
        Err(CmdloopError::ConfigError(_))
    ));
    assert_eq!(scheduler.command_count(), 1);
    Ok(())
}

#[test]
fn lookups_by_name_round_trip() -> TestResult {
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let drive = scheduler.add_resource("drive")?;
    let arcade = scheduler.add_command(RecordingCommand::new("arcade", set(&[drive]), &log))?;

    assert_eq!(scheduler.resource_id("drive"), Some(drive));
    assert_eq!(scheduler.command_id("arcade"), Some(arcade));
    assert_eq!(scheduler.command_name(arcade), Some("arcade"));
    assert_eq!(scheduler.requirements_of(arcade), Some(&set(&[drive])));
    assert_eq!(scheduler.resource(drive).map(|r| r.name()), Some("drive"));
    assert_eq!(scheduler.resource_id("arm"), None);
    Ok(())
}

#[test]
fn step_failure_aborts_the_tick() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let left = scheduler.add_resource("left")?;
    let right = scheduler.add_resource("right")?;
    let broken = scheduler.add_command(
        RecordingCommand::new("broken", set(&[left]), &log).failing_in(Hook::Step),
    )?;
    let healthy = scheduler.add_command(RecordingCommand::new("healthy", set(&[right]), &log))?;

    scheduler.start(broken)?;
    scheduler.start(healthy)?;
    log.take();

    match scheduler.tick() {
        Err(CmdloopError::Hook { command, hook, .. }) => {
            assert_eq!(command, "broken");
            assert_eq!(hook, Hook::Step);
        }
        other => panic!("expected hook error, got {other:?}"),
    }
    // Commands after the failing one were not stepped this tick.
    assert_eq!(log.events(), vec![HookEvent::step("broken")]);
    assert!(scheduler.is_running(broken));
    Ok(())
}

#[test]
fn end_failure_still_releases_resources() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let arm = scheduler.add_resource("arm")?;
    let sticky = scheduler.add_command(
        RecordingCommand::new("sticky", set(&[arm]), &log).failing_in(Hook::End),
    )?;
    let next = scheduler.add_command(RecordingCommand::new("next", set(&[arm]), &log))?;

    scheduler.start(sticky)?;
    let err = scheduler.start(next).unwrap_err();
    assert!(err.to_string().contains("on_end"));

    assert_eq!(scheduler.state_of(sticky), Some(CommandState::Idle));
    assert_eq!(scheduler.holder_of(arm), None);
    assert!(!scheduler.is_running(next));

    // Retrying works because the failing holder is gone.
    scheduler.start(next)?;
    assert_eq!(scheduler.holder_of(arm), Some(next));
    assert_eq!(log.ends("sticky"), 1);
    Ok(())
}

#[test]
fn start_failure_leaves_command_running_for_cleanup() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut scheduler = Scheduler::new();
    let arm = scheduler.add_resource("arm")?;
    let shaky = scheduler.add_command(
        RecordingCommand::new("shaky", set(&[arm]), &log).failing_in(Hook::Start),
    )?;

    let err = scheduler.start(shaky).unwrap_err();
    assert!(matches!(err, CmdloopError::Hook { hook: Hook::Start, .. }));
    assert!(scheduler.is_running(shaky));
    assert_eq!(scheduler.holder_of(arm), Some(shaky));

    scheduler.cancel(shaky)?;
    assert_eq!(log.ends("shaky"), 1);
    Ok(())
}
