// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Errors raised by a command's action are *not* represented here: they are
//! captured as [`CommandState::Failure`](crate::types::CommandState::Failure)
//! and only ever surface through the runner's state. `RunnerError` covers the
//! things that do propagate to the host: misuse of the loop, cancellation,
//! and configuration problems.

use std::sync::Arc;

use thiserror::Error;

/// Shareable error cause attached to [`RunnerError::Cancelled`].
pub type SharedCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum RunnerError {
    /// The run loop was started while another loop already holds the guard
    /// for the same runner. This is a host bug, not a runtime condition.
    #[error("command runner '{name}' is already running")]
    AlreadyRunning { name: String },

    /// The host cancelled the loop. `source` carries the action's own error
    /// when the action failed after the context had been cancelled.
    #[error("command runner '{name}' was cancelled")]
    Cancelled {
        name: String,
        #[source]
        source: Option<SharedCause>,
    },

    /// `require()` was called while the runner holds no value.
    #[error("command runner has no result")]
    NoValue,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    pub(crate) fn cancelled(name: &str, cause: Option<anyhow::Error>) -> Self {
        RunnerError::Cancelled {
            name: name.to_string(),
            source: cause.map(|err| {
                let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = err.into();
                SharedCause::from(boxed)
            }),
        }
    }

    /// True for the cancellation kind, which hosts usually treat as a
    /// normal shutdown.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunnerError::Cancelled { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;
