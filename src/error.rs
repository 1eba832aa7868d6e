//! Error types shared by the interpreter and its collaborators

use std::path::PathBuf;

use thiserror::Error;

/// Outcome of a failed command execution, as reported by a [`CommandExecutor`]
///
/// [`CommandExecutor`]: crate::dispatch::CommandExecutor
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command name did not resolve to any known command
    #[error("no such command: {0}")]
    NoSuchCommand(String),
    /// The command exists but was given the wrong number of arguments
    #[error("{command}: expected {} argument(s), got {given}", arity(.min, .max))]
    ArgumentCount {
        command: String,
        min: usize,
        max: Option<usize>,
        given: usize,
    },
    /// Anything else the executor could not do
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

fn arity(min: &usize, max: &Option<usize>) -> String {
    match *max {
        Some(max) if max == *min => min.to_string(),
        Some(max) => format!("{}-{}", min, max),
        None => format!("at least {}", min),
    }
}

/// Invalid modifier key notation in a `@...@` key-spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySpecError {
    #[error("empty key notation")]
    Empty,
    #[error("no key after modifiers in '{0}'")]
    MissingKey(String),
    #[error("unknown modifier '{modifier}' in '{spec}'")]
    UnknownModifier { spec: String, modifier: String },
    #[error("unknown key name '{key}' in '{spec}'")]
    UnknownKey { spec: String, key: String },
    #[error("'{0}' has no modifier")]
    NoModifier(String),
}

/// Failure to load the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
