// src/host.rs

//! Host-side lifecycle for a [`CommandRunner`].
//!
//! A runner's loop has to be started exactly once and cancelled when the
//! runner is discarded. [`spawn`] does both halves: it starts the loop on the
//! Tokio runtime with a fresh cancellation token and returns a
//! [`RunnerHandle`] that cancels the loop on [`shutdown`](RunnerHandle::shutdown)
//! or on drop.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::{Result, RunnerError};
use crate::runner::CommandRunner;

/// Owns the spawned run loop of a runner.
#[derive(Debug)]
pub struct RunnerHandle<T> {
    runner: Arc<CommandRunner<T>>,
    cancel: CancellationToken,
    join: Option<JoinHandle<Result<()>>>,
}

/// Spawn the run loop of `runner` with its own cancellation token.
pub fn spawn<T>(runner: Arc<CommandRunner<T>>) -> RunnerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    spawn_with_token(runner, CancellationToken::new())
}

/// Spawn the run loop under a child of `parent`, so cancelling the parent
/// (e.g. an application-wide shutdown token) also stops this runner.
pub fn spawn_child<T>(runner: Arc<CommandRunner<T>>, parent: &CancellationToken) -> RunnerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    spawn_with_token(runner, parent.child_token())
}

fn spawn_with_token<T>(runner: Arc<CommandRunner<T>>, cancel: CancellationToken) -> RunnerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    let loop_runner = Arc::clone(&runner);
    let loop_cancel = cancel.clone();
    debug!(runner = %runner.name(), "spawning run loop");

    let join = tokio::spawn(async move { loop_runner.run(loop_cancel).await });

    RunnerHandle {
        runner,
        cancel,
        join: Some(join),
    }
}

impl<T> RunnerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn runner(&self) -> &Arc<CommandRunner<T>> {
        &self.runner
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request cancellation without waiting for the loop to unwind.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// The expected `Cancelled` outcome maps to `Ok(())`. Anything else (the
    /// loop was never able to start, or it panicked) is returned as an error.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        let Some(join) = self.join.take() else {
            return Ok(());
        };

        match join.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) if err.is_cancelled() => {
                info!(runner = %self.runner.name(), "run loop shut down");
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(RunnerError::Other(join_err.into())),
        }
    }
}

impl<T> Drop for RunnerHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
