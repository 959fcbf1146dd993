// src/exec/command.rs

//! Pluggable command abstraction.
//!
//! The run loop talks to a `Command` instead of a raw closure. This keeps the
//! loop generic over "what" is executed while letting callers either:
//!
//! - implement [`Command`] on their own type (a client holding a connection
//!   pool, a device handle, ...), or
//! - wrap a plain async closure with [`command_fn`].
//!
//! Timeouts, retries and backoff are the action's own business; the runner
//! only awaits the returned future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Command::execute`].
pub type BoxCommandFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// An asynchronous action producing `T` or failing with an error.
///
/// Each call to [`execute`](Command::execute) must produce a fresh future.
/// The runner may drop that future before completion when the host cancels
/// the loop, so any resource the action acquires should be released on drop.
pub trait Command<T>: Send + Sync + 'static {
    fn execute(&self) -> BoxCommandFuture<'_, T>;
}

/// Closure-backed command.
///
/// Wraps a closure that *creates* a new future per execution.
pub struct CommandFn<F> {
    f: F,
}

impl<F> CommandFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for CommandFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFn").finish_non_exhaustive()
    }
}

impl<T, F, Fut> Command<T> for CommandFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    fn execute(&self) -> BoxCommandFuture<'_, T> {
        Box::pin((self.f)())
    }
}

/// Convenience for `CommandFn::new`.
///
/// ```
/// use command_runner::exec::{command_fn, Command};
///
/// let cmd = command_fn(|| async { Ok::<_, anyhow::Error>(42) });
/// # let _ = &cmd as &dyn Command<i32>;
/// ```
pub fn command_fn<F>(f: F) -> CommandFn<F> {
    CommandFn::new(f)
}
