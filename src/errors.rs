// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::command::Hook;

#[derive(Error, Debug)]
pub enum CmdloopError {
    /// Structurally invalid wiring detected at setup time. Never retried.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Cycle detected in command groups: {0}")]
    GroupCycle(String),

    /// A user-supplied hook failed; the current tick was aborted.
    #[error("command '{command}' failed in {hook} hook: {source:#}")]
    Hook {
        command: String,
        hook: Hook,
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CmdloopError {
    pub(crate) fn hook(command: &str, hook: Hook, source: anyhow::Error) -> Self {
        CmdloopError::Hook {
            command: command.to_string(),
            hook,
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdloopError>;
