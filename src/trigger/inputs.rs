// src/trigger/inputs.rs

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::InputSource;

/// Shared table of named input values, sampled once per tick by the loop
/// driver and read by binding sources.
///
/// Buttons are stored as `0.0` / `1.0`; axes keep their analog value. The
/// table is single-threaded like the rest of the control cycle; clones share
/// the same storage.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    values: Rc<RefCell<BTreeMap<String, f64>>>,
}

impl InputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: f64) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    pub fn set_pressed(&self, name: &str, pressed: bool) {
        self.set(name, if pressed { 1.0 } else { 0.0 });
    }

    /// Current value of `name`; unknown inputs read as `0.0`.
    pub fn value(&self, name: &str) -> f64 {
        self.values.borrow().get(name).copied().unwrap_or(0.0)
    }

    /// Reset every known input to `0.0`.
    pub fn clear(&self) {
        for value in self.values.borrow_mut().values_mut() {
            *value = 0.0;
        }
    }

    /// A source that is active while the value is non-zero.
    pub fn button(&self, name: &str) -> impl InputSource + 'static {
        let table = self.clone();
        let name = name.to_string();
        move || table.value(&name) != 0.0
    }

    /// A source that is active while `|value| > threshold`.
    pub fn axis_beyond(&self, name: &str, threshold: f64) -> impl InputSource + 'static {
        let table = self.clone();
        let name = name.to_string();
        move || table.value(&name).abs() > threshold
    }
}
