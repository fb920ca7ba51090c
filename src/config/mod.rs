// src/config/mod.rs

//! Configuration loading and validation for cmdloop.
//!
//! Responsibilities:
//! - Define the TOML-backed robot description (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate references, default-command shape and group nesting
//!   (`validate.rs`).
//! - Turn a validated description into a wired-up scheduler (`wiring.rs`).

pub mod loader;
pub mod model;
pub mod validate;
pub mod wiring;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    AutonomousSection, BindingConfig, CommandConfig, ConfigFile, GroupConfig, GroupStepConfig,
    LoopSection, RawConfigFile, ResourceConfig,
};
pub use wiring::Wiring;
