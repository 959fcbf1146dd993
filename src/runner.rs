// src/runner.rs

//! Public single-flight command runner.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, trace};

use crate::config::RunnerConfig;
use crate::engine::{Mailbox, StateCell, run_loop};
use crate::errors::{Result, RunnerError};
use crate::exec::{Command, CommandFn};
use crate::types::CommandState;

/// Runs a [`Command`] at most once at a time, collapsing redundant requests.
///
/// - [`try_run`](Self::try_run) may be called from anywhere, any number of
///   times; it never blocks and at most one extra execution results from all
///   calls made while the runner is busy.
/// - [`run`](Self::run) is the loop the host must drive exactly once for the
///   runner's lifetime (see [`crate::host::spawn`]).
/// - [`state`](Self::state) / [`subscribe`](Self::subscribe) expose the
///   current [`CommandState`].
pub struct CommandRunner<T> {
    name: String,
    command: Box<dyn Command<T>>,
    cell: StateCell<T>,
    mailbox: Mailbox,
}

impl<T> fmt::Debug for CommandRunner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("name", &self.name)
            .field("mailbox", &self.mailbox)
            .finish_non_exhaustive()
    }
}

impl<T> CommandRunner<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(command: impl Command<T>) -> Self {
        Self::with_config(RunnerConfig::default(), command)
    }

    pub fn with_config(config: RunnerConfig, command: impl Command<T>) -> Self {
        Self {
            name: config.name,
            command: Box::new(command),
            cell: StateCell::new(),
            mailbox: Mailbox::new(),
        }
    }

    /// Build a runner from an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::new(CommandFn::new(f))
    }

    /// Convenience for sharing the runner between the host and callers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CommandState<T> {
        self.cell.get()
    }

    /// Receiver that is notified on every state transition.
    ///
    /// When the loop is cancelled mid-execution the cell rolls back from
    /// `Running` to the state before it, so a previous `Success` or `Failure`
    /// is published again. Observers waiting for "an outcome" see that as a
    /// change; it is not a new result.
    pub fn subscribe(&self) -> watch::Receiver<CommandState<T>> {
        self.cell.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.cell.with(CommandState::is_running)
    }

    pub fn has_failed(&self) -> bool {
        self.cell.with(CommandState::has_failed)
    }

    pub fn has_value(&self) -> bool {
        self.cell.with(CommandState::has_value)
    }

    /// Nothing has run since creation or the last `reset()`.
    pub fn not_started(&self) -> bool {
        self.cell.with(CommandState::is_idle)
    }

    /// The last finished outcome, if any.
    pub fn result(&self) -> Option<std::result::Result<T, Arc<anyhow::Error>>> {
        self.cell.with(CommandState::to_result)
    }

    /// The last value, or [`RunnerError::NoValue`] if the runner is not in
    /// `Success`.
    pub fn require(&self) -> Result<T> {
        self.cell
            .with(|state| state.value().cloned())
            .ok_or(RunnerError::NoValue)
    }

    /// Request an execution. Does nothing if one is already pending or in
    /// flight.
    pub fn try_run(&self) {
        if self.mailbox.offer() {
            trace!(runner = %self.name, "trigger accepted");
        } else {
            debug!(runner = %self.name, "runner busy; trigger coalesced");
        }
    }

    /// Force the state back to `Idle`. An in-flight execution is not
    /// affected and will still publish its outcome.
    pub fn reset(&self) {
        debug!(runner = %self.name, "reset");
        self.cell.reset();
    }

    /// Drive the runner until `cancel` fires.
    ///
    /// Returns [`RunnerError::AlreadyRunning`] without waiting if another
    /// call to `run` is active for this runner. Otherwise it returns
    /// [`RunnerError::Cancelled`] once the host cancels the token.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let guard = self.mailbox.try_claim(&self.name)?;
        let span = info_span!("command_runner", runner = %self.name);
        run_loop(&self.name, self.command.as_ref(), &self.cell, guard, &cancel)
            .instrument(span)
            .await
    }
}
