use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use cmdloop::command::{Command, Hook, HookResult};
use cmdloop::resource::ResourceSet;

/// One observed hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Start(String),
    Step(String),
    End { command: String, interrupted: bool },
}

impl HookEvent {
    pub fn command(&self) -> &str {
        match self {
            HookEvent::Start(c) | HookEvent::Step(c) => c,
            HookEvent::End { command, .. } => command,
        }
    }

    pub fn start(command: &str) -> Self {
        HookEvent::Start(command.to_string())
    }

    pub fn step(command: &str) -> Self {
        HookEvent::Step(command.to_string())
    }

    pub fn end(command: &str, interrupted: bool) -> Self {
        HookEvent::End {
            command: command.to_string(),
            interrupted,
        }
    }
}

/// Shared, ordered log of hook invocations across many commands.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: HookEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<HookEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn for_command(&self, command: &str) -> Vec<HookEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.command() == command)
            .collect()
    }

    pub fn starts(&self, command: &str) -> usize {
        self.count(|e| matches!(e, HookEvent::Start(c) if c == command))
    }

    pub fn steps(&self, command: &str) -> usize {
        self.count(|e| matches!(e, HookEvent::Step(c) if c == command))
    }

    pub fn ends(&self, command: &str) -> usize {
        self.count(|e| matches!(e, HookEvent::End { command: c, .. } if c == command))
    }

    fn count(&self, pred: impl Fn(&HookEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

/// A command that records every hook call into an [`EventLog`].
///
/// - `finishing_after(n)` makes it finish after `n` steps.
/// - `failing_in(hook)` makes that hook return an error (after recording).
#[derive(Debug)]
pub struct RecordingCommand {
    name: String,
    requirements: ResourceSet,
    log: EventLog,
    finish_after: Option<u64>,
    fail_in: Option<Hook>,
    steps: u64,
}

impl RecordingCommand {
    pub fn new(name: &str, requirements: ResourceSet, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            requirements,
            log: log.clone(),
            finish_after: None,
            fail_in: None,
            steps: 0,
        }
    }

    pub fn finishing_after(mut self, steps: u64) -> Self {
        self.finish_after = Some(steps);
        self
    }

    pub fn failing_in(mut self, hook: Hook) -> Self {
        self.fail_in = Some(hook);
        self
    }

    fn outcome(&self, hook: Hook) -> HookResult {
        if self.fail_in == Some(hook) {
            return Err(anyhow!("{} refused to run {hook}", self.name));
        }
        Ok(())
    }
}

impl Command for RecordingCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> &ResourceSet {
        &self.requirements
    }

    fn on_start(&mut self) -> HookResult {
        self.steps = 0;
        self.log.push(HookEvent::start(&self.name));
        self.outcome(Hook::Start)
    }

    fn on_step(&mut self) -> HookResult {
        self.steps += 1;
        self.log.push(HookEvent::step(&self.name));
        self.outcome(Hook::Step)
    }

    fn is_finished(&self) -> bool {
        self.finish_after.is_some_and(|n| self.steps >= n)
    }

    fn on_end(&mut self, interrupted: bool) -> HookResult {
        self.log.push(HookEvent::end(&self.name, interrupted));
        self.outcome(Hook::End)
    }
}

/// A boolean input that tests flip by hand.
///
/// Single-threaded like `InputTable`; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct Switch {
    state: Rc<Cell<bool>>,
}

impl Switch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, active: bool) {
        self.state.set(active);
    }

    pub fn press(&self) {
        self.set(true);
    }

    pub fn release(&self) {
        self.set(false);
    }

    pub fn is_pressed(&self) -> bool {
        self.state.get()
    }

    /// An input source reading this switch, for `Scheduler::bind`.
    pub fn source(&self) -> impl Fn() -> bool + 'static {
        let state = Rc::clone(&self.state);
        move || state.get()
    }
}
