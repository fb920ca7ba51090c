// src/scripted/outputs.rs

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared table of actuator outputs, keyed by resource name.
///
/// Clones share storage. Only the command holding a resource writes its
/// entry; the scheduler's holder table guarantees there is one such command.
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    values: Rc<RefCell<BTreeMap<String, f64>>>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, resource: &str, value: f64) {
        self.values.borrow_mut().insert(resource.to_string(), value);
    }

    /// Last written output; `None` if nothing was ever written.
    pub fn get(&self, resource: &str) -> Option<f64> {
        self.values.borrow().get(resource).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.values.borrow().clone()
    }
}
