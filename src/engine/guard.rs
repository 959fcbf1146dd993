// src/engine/guard.rs

//! Exclusive ownership of a runner's mailbox for the lifetime of one run
//! loop.
//!
//! A `LoopGuard` is obtained through [`Mailbox::try_claim`](super::Mailbox::try_claim).
//! Holding it means "this loop is the only consumer". Dropping it, on any
//! exit path including the loop future being aborted, does two things:
//!
//! - drains the busy marker if an execution was in flight, so the slot does
//!   not stay occupied;
//! - releases the receiver lock, so a later `run()` can claim it again.

use tokio::sync::{MutexGuard, mpsc};
use tracing::{debug, trace};

use crate::types::Trigger;

pub struct LoopGuard<'a> {
    name: &'a str,
    tx: &'a mpsc::Sender<Trigger>,
    rx: MutexGuard<'a, mpsc::Receiver<Trigger>>,
    busy: bool,
}

impl<'a> LoopGuard<'a> {
    pub(super) fn new(
        name: &'a str,
        tx: &'a mpsc::Sender<Trigger>,
        rx: MutexGuard<'a, mpsc::Receiver<Trigger>>,
    ) -> Self {
        debug!(runner = %name, "run loop guard acquired");
        Self {
            name,
            tx,
            rx,
            busy: false,
        }
    }

    /// Wait for the next trigger and consume it.
    ///
    /// Returns `None` only if every sender has been dropped, which cannot
    /// happen while the owning runner is alive.
    pub async fn next_trigger(&mut self) -> Option<Trigger> {
        self.rx.recv().await
    }

    /// Refill the slot so that triggers arriving during the execution are
    /// dropped.
    ///
    /// If a concurrent `offer()` already landed in the slot between the
    /// receive and this call, that token serves as the marker.
    pub fn mark_busy(&mut self) {
        match self.tx.try_send(Trigger) {
            Ok(()) => trace!(runner = %self.name, "busy marker placed"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!(runner = %self.name, "slot already filled; reusing token as busy marker")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!(runner = %self.name, "mailbox closed while marking busy")
            }
        }
        self.busy = true;
    }

    /// Drain the busy marker, freeing the slot for the next trigger.
    pub fn release_busy(&mut self) {
        if !self.busy {
            return;
        }
        self.busy = false;
        if self.rx.try_recv().is_ok() {
            trace!(runner = %self.name, "busy marker drained");
        }
    }
}

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        self.release_busy();
        debug!(runner = %self.name, "run loop guard released");
    }
}
