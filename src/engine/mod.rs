// src/engine/mod.rs

//! Single-flight engine behind [`CommandRunner`](crate::CommandRunner).
//!
//! This module ties together:
//! - the state cell that publishes [`CommandState`](crate::types::CommandState)
//!   transitions to observers
//! - the single-slot mailbox that is both trigger queue and busy flag
//! - the loop guard that makes sure only one run loop owns a mailbox
//! - the run loop that drains triggers, executes the command, and reconciles
//!   its outcome with host cancellation
//!
//! Nothing in here spawns tasks; the host decides where the loop runs (see
//! [`crate::host`]).

pub mod guard;
pub mod mailbox;
pub mod run_loop;
pub mod state_cell;

pub use guard::LoopGuard;
pub use mailbox::Mailbox;
pub use run_loop::{reconcile, run_loop};
pub use state_cell::StateCell;
