// src/trigger/mod.rs

//! Edge-triggered bindings from boolean inputs to command activations.
//!
//! - [`InputSource`] is the only capability the core needs from an input:
//!   "read the current boolean value".
//! - [`EdgeDetector`] keeps the previous value and reports rising/falling
//!   edges.
//! - [`Binding`] combines a source, an [`ActivationMode`] and a target
//!   command; the scheduler polls every binding once per tick.
//! - [`inputs`] provides a named, shared input table for analog and
//!   button-like values.

use std::fmt;

use crate::command::CommandId;
pub use crate::types::ActivationMode;

pub mod inputs;

pub use inputs::InputTable;

/// A readable boolean input (button, threshold over an axis, ...).
pub trait InputSource {
    fn is_active(&self) -> bool;
}

impl<F> InputSource for F
where
    F: Fn() -> bool,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// Direction of a detected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// false -> true
    Rising,
    /// true -> false
    Falling,
}

/// Remembers the previous sample of a boolean signal.
///
/// Starts out as `false`, so a source that is already active on the first
/// poll reports a rising edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and report the edge (if any) since the last update.
    pub fn update(&mut self, current: bool) -> Option<Edge> {
        let edge = match (self.previous, current) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.previous = current;
        edge
    }

    pub fn previous(&self) -> bool {
        self.previous
    }

    /// Forget the last sample; an active source then reads as a new press.
    pub fn reset(&mut self) {
        self.previous = false;
    }
}

/// What a binding asks the scheduler to do after an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    Start,
    Cancel,
}

/// Wiring from an input source to a command activation.
pub struct Binding {
    source: Box<dyn InputSource>,
    mode: ActivationMode,
    target: CommandId,
    detector: EdgeDetector,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("mode", &self.mode)
            .field("target", &self.target)
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

impl Binding {
    pub fn new(source: Box<dyn InputSource>, mode: ActivationMode, target: CommandId) -> Self {
        Self {
            source,
            mode,
            target,
            detector: EdgeDetector::new(),
        }
    }

    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    pub fn target(&self) -> CommandId {
        self.target
    }

    /// Forget the edge state, as if the binding had just been registered.
    pub fn reset(&mut self) {
        self.detector.reset();
    }

    /// Sample the source once and map the detected edge to an action.
    ///
    /// The edge state is updated on every call, whether or not an action
    /// results.
    pub fn poll(&mut self) -> Option<BindingAction> {
        let edge = self.detector.update(self.source.is_active())?;
        match (self.mode, edge) {
            (ActivationMode::OnPress, Edge::Rising) => Some(BindingAction::Start),
            (ActivationMode::OnRelease, Edge::Falling) => Some(BindingAction::Start),
            (ActivationMode::WhileHeld, Edge::Rising) => Some(BindingAction::Start),
            (ActivationMode::WhileHeld, Edge::Falling) => Some(BindingAction::Cancel),
            _ => None,
        }
    }
}
