// src/engine/state_cell.rs

//! Publish/subscribe cell holding the runner's current [`CommandState`].
//!
//! Backed by a `tokio::sync::watch` channel: observers either read a snapshot
//! with [`StateCell::get`] or hold a receiver from [`StateCell::subscribe`]
//! and await `changed()`. Slow observers only ever see the latest state.

use tokio::sync::watch;
use tracing::debug;

use crate::types::CommandState;

#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<CommandState<T>>,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// New cell in the `Idle` state.
    pub fn new() -> Self {
        // The sender keeps working with zero receivers, so the initial one
        // can be dropped right away.
        let (tx, _rx) = watch::channel(CommandState::Idle);
        Self { tx }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> CommandState<T> {
        self.tx.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&CommandState<T>) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<CommandState<T>> {
        self.tx.subscribe()
    }

    /// Replace the state and notify every observer. Returns the previous
    /// state.
    pub fn publish(&self, state: CommandState<T>) -> CommandState<T> {
        let next = state.name();
        let prev = self.tx.send_replace(state);
        debug!(from = prev.name(), to = next, "state transition");
        prev
    }

    /// Force the state back to `Idle`, discarding the previous outcome.
    pub fn reset(&self) {
        self.publish(CommandState::Idle);
    }

    /// Put `prev` back only if the cell still reads `Running`.
    ///
    /// Used when an execution is abandoned: a concurrent `reset()` that
    /// already moved the cell away from `Running` is left untouched.
    pub fn restore_if_running(&self, prev: CommandState<T>) -> bool {
        let mut prev = Some(prev);
        self.tx.send_if_modified(|current| {
            if !current.is_running() {
                return false;
            }
            if let Some(prev) = prev.take() {
                debug!(to = prev.name(), "rolling back abandoned execution");
                *current = prev;
            }
            true
        })
    }
}

impl<T> Default for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
