// src/engine/mailbox.rs

//! Single-slot trigger mailbox.
//!
//! The mailbox is a bounded `mpsc` channel of capacity one. The slot doubles
//! as a busy flag:
//!
//! - `offer()` is a non-blocking `try_send`. If the slot is occupied the
//!   trigger is dropped, which is how concurrent requests coalesce.
//! - While an execution is in flight the run loop keeps a marker token in the
//!   slot (see [`LoopGuard::mark_busy`]), so every `offer()` during that
//!   window is dropped too.
//!
//! The receiving half lives behind a `tokio::sync::Mutex`. Taking it with
//! `try_lock` is the per-runner exclusivity guard: only one run loop can hold
//! the receiver at a time.

use tokio::sync::{Mutex, mpsc};
use tracing::trace;

use crate::errors::{Result, RunnerError};
use crate::types::Trigger;

use super::guard::LoopGuard;

#[derive(Debug)]
pub struct Mailbox {
    tx: mpsc::Sender<Trigger>,
    rx: Mutex<mpsc::Receiver<Trigger>>,
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Try to place a trigger in the slot without waiting.
    ///
    /// Returns `false` when the slot was already occupied and the trigger was
    /// coalesced into the pending (or in-flight) execution.
    pub fn offer(&self) -> bool {
        match self.tx.try_send(Trigger) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => false,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!("mailbox closed; dropping trigger");
                false
            }
        }
    }

    /// Acquire exclusive ownership of the receiving half.
    ///
    /// Fails immediately with [`RunnerError::AlreadyRunning`] if another run
    /// loop holds it; this never waits.
    pub fn try_claim<'a>(&'a self, name: &'a str) -> Result<LoopGuard<'a>> {
        let rx = self.rx.try_lock().map_err(|_| RunnerError::AlreadyRunning {
            name: name.to_string(),
        })?;
        Ok(LoopGuard::new(name, &self.tx, rx))
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
