use std::fmt;
use std::sync::Arc;

/// Observable outcome of a command runner.
///
/// - `Idle`: nothing has run yet, or the runner was `reset()`.
/// - `Running`: an execution is in flight.
/// - `Success`: the last execution returned a value.
/// - `Failure`: the last execution returned an error.
///
/// There is no terminal state: a new trigger moves any state back to
/// `Running`, and `reset()` moves any state back to `Idle`.
#[derive(Debug, Clone, Default)]
pub enum CommandState<T> {
    #[default]
    Idle,
    Running,
    Success(T),
    Failure(Arc<anyhow::Error>),
}

impl<T> CommandState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, CommandState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CommandState::Running)
    }

    /// The command has run and its last execution failed.
    pub fn has_failed(&self) -> bool {
        matches!(self, CommandState::Failure(_))
    }

    /// The command has run and its last execution produced a value.
    pub fn has_value(&self) -> bool {
        matches!(self, CommandState::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CommandState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<anyhow::Error>> {
        match self {
            CommandState::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Short name of the current variant, used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            CommandState::Idle => "idle",
            CommandState::Running => "running",
            CommandState::Success(_) => "success",
            CommandState::Failure(_) => "failure",
        }
    }
}

impl<T: Clone> CommandState<T> {
    /// Collapse the state into a finished result.
    ///
    /// `Idle` and `Running` have no result yet and map to `None`.
    pub fn to_result(&self) -> Option<Result<T, Arc<anyhow::Error>>> {
        match self {
            CommandState::Idle | CommandState::Running => None,
            CommandState::Success(value) => Some(Ok(value.clone())),
            CommandState::Failure(err) => Some(Err(Arc::clone(err))),
        }
    }
}

impl<T> fmt::Display for CommandState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandState::Failure(err) => write!(f, "failure: {err}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Unit token placed in the mailbox: "an execution has been requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger;
