// src/exec/mod.rs

//! Action execution seam.
//!
//! - [`command`] provides the `Command` trait the run loop executes and a
//!   closure-backed `CommandFn` implementation.

pub mod command;

pub use command::{BoxCommandFuture, Command, CommandFn, command_fn};
