// src/lib.rs

//! Single-flight command runner.
//!
//! A [`CommandRunner`] executes an asynchronous [`Command`](exec::Command)
//! on request while guaranteeing that:
//!
//! - only one execution is ever in flight;
//! - redundant concurrent requests collapse into the in-flight (or next)
//!   execution;
//! - the outcome is published as an observable [`CommandState`].
//!
//! ```no_run
//! use command_runner::{CommandRunner, host};
//!
//! # async fn demo() -> command_runner::errors::Result<()> {
//! let runner = CommandRunner::from_fn(|| async { Ok::<_, anyhow::Error>(42) }).into_shared();
//! let handle = host::spawn(runner.clone());
//!
//! runner.try_run();
//! let mut rx = runner.subscribe();
//! rx.wait_for(|s| s.has_value()).await.ok();
//! assert_eq!(runner.require()?, 42);
//!
//! handle.shutdown().await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod runner;
pub mod types;

use std::sync::atomic::Ordering;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::demo::{SimulatedFetch, describe, drive_demo};

pub use crate::errors::RunnerError;
pub use crate::host::RunnerHandle;
pub use crate::runner::CommandRunner;
pub use crate::types::CommandState;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - a runner over the simulated command
/// - the host loop (spawned, cancelled on exit)
/// - a state printer
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)?;
    if let Some(msg) = args.fail {
        cfg.demo.fail_with = Some(msg);
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fetch = SimulatedFetch::new(&cfg.demo);
    let executions = fetch.executions();
    let runner = CommandRunner::with_config(cfg.runner.clone(), fetch).into_shared();
    let handle = host::spawn(runner.clone());

    // Print every transition observed by an independent subscriber.
    let printer = {
        let mut rx = runner.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                println!("  state -> {}", describe(&state));
            }
        })
    };

    tokio::select! {
        res = drive_demo(&runner, &cfg.demo) => {
            res?;
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("interrupted; shutting down");
        }
    }

    handle.shutdown().await?;
    printer.abort();

    println!(
        "{} execution(s) for {} trigger(s)",
        executions.load(Ordering::SeqCst),
        cfg.demo.triggers * cfg.demo.rounds
    );
    Ok(())
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("command-runner dry-run");
    println!("  runner.name = {}", cfg.runner.name);
    println!("  demo.delay = {:?}", cfg.demo.delay);
    if let Some(ref msg) = cfg.demo.fail_with {
        println!("  demo.fail_with = {msg}");
    }
    println!("  demo.triggers = {}", cfg.demo.triggers);
    println!("  demo.trigger_interval = {:?}", cfg.demo.trigger_interval);
    println!("  demo.rounds = {}", cfg.demo.rounds);

    debug!("dry-run complete (no execution)");
}
