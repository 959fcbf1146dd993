// src/engine/run_loop.rs

//! The long-lived run loop behind [`CommandRunner::run`](crate::CommandRunner::run).
//!
//! One iteration:
//!
//! 1. wait for a trigger and consume it;
//! 2. put a busy marker back into the slot;
//! 3. publish `Running`;
//! 4. execute the command;
//! 5. reconcile the outcome with the host's cancellation token;
//! 6. publish `Success` / `Failure`;
//! 7. drain the busy marker.
//!
//! Both suspension points (1 and 4) race against the cancellation token.
//! When the token wins while the command is executing, the command's future
//! is dropped and nothing is published for that execution. A command that
//! panics is caught and published as `Failure`; the loop keeps running.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{Result, RunnerError};
use crate::exec::Command;
use crate::types::CommandState;

use super::guard::LoopGuard;
use super::state_cell::StateCell;

/// Drive the command until the host cancels `cancel`.
///
/// Always ends with `Err(RunnerError::Cancelled)` unless the mailbox was
/// closed underneath it. The guard is dropped on every exit path, which
/// drains an outstanding busy marker and releases the exclusivity lock.
pub async fn run_loop<T>(
    name: &str,
    command: &dyn Command<T>,
    cell: &StateCell<T>,
    mut guard: LoopGuard<'_>,
    cancel: &CancellationToken,
) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
{
    info!(runner = %name, "run loop started");

    loop {
        let trigger = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(runner = %name, "run loop cancelled while idle");
                return Err(RunnerError::cancelled(name, None));
            }
            trigger = guard.next_trigger() => trigger,
        };

        if trigger.is_none() {
            info!(runner = %name, "mailbox closed; run loop exiting");
            return Ok(());
        }

        guard.mark_busy();
        let execution = Execution::start(cell);
        debug!(runner = %name, "executing command");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            res = AssertUnwindSafe(command.execute()).catch_unwind() => {
                Some(res.unwrap_or_else(|payload| Err(panic_error(payload))))
            }
        };

        match reconcile(name, outcome, cancel) {
            Ok(next) => {
                execution.finish(next);
                guard.release_busy();
            }
            Err(err) => {
                drop(execution);
                guard.release_busy();
                info!(runner = %name, "run loop cancelled during execution; outcome discarded");
                return Err(err);
            }
        }
    }
}

/// Turn a caught panic payload into the error stored as `Failure`.
fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    anyhow::anyhow!("command panicked: {msg}")
}

/// One published `Running` period.
///
/// Dropping it without calling [`finish`](Execution::finish), whether on
/// cancellation or because the loop future itself was dropped, rolls the
/// cell back to whatever preceded `Running`.
struct Execution<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: &'a StateCell<T>,
    prev: Option<CommandState<T>>,
}

impl<'a, T> Execution<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn start(cell: &'a StateCell<T>) -> Self {
        let prev = cell.publish(CommandState::Running);
        Self {
            cell,
            prev: Some(prev),
        }
    }

    fn finish(mut self, next: CommandState<T>) {
        self.prev = None;
        self.cell.publish(next);
    }
}

impl<T> Drop for Execution<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            self.cell.restore_if_running(prev);
        }
    }
}

/// Turn the command's outcome into the state to publish, or into the error
/// that terminates the loop.
///
/// `outcome == None` means the command never completed because the token
/// fired first. A completed outcome is still discarded when the token has
/// been cancelled by now, even a successful one.
pub fn reconcile<T>(
    name: &str,
    outcome: Option<anyhow::Result<T>>,
    cancel: &CancellationToken,
) -> Result<CommandState<T>> {
    let Some(res) = outcome else {
        return Err(RunnerError::cancelled(name, None));
    };

    if cancel.is_cancelled() {
        return match res {
            Ok(_) => {
                debug!(runner = %name, "discarding value that completed after cancellation");
                Err(RunnerError::cancelled(name, None))
            }
            Err(err) => match err.downcast::<RunnerError>() {
                // The command already reported cancellation; pass it on.
                Ok(cancelled @ RunnerError::Cancelled { .. }) => Err(cancelled),
                Ok(other) => Err(RunnerError::cancelled(name, Some(other.into()))),
                Err(err) => Err(RunnerError::cancelled(name, Some(err))),
            },
        };
    }

    match res {
        Ok(value) => {
            debug!(runner = %name, "command succeeded");
            Ok(CommandState::Success(value))
        }
        Err(err) => {
            warn!(runner = %name, error = %err, "command failed");
            Ok(CommandState::Failure(std::sync::Arc::new(err)))
        }
    }
}
