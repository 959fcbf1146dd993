// src/demo.rs

//! Simulated command used by the demo binary.
//!
//! Stands in for a network call: it sleeps for a configured delay and then
//! either returns a numbered response or fails with a configured message.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::DemoConfig;
use crate::exec::{BoxCommandFuture, Command};
use crate::runner::CommandRunner;
use crate::types::CommandState;

#[derive(Debug, Clone)]
pub struct SimulatedFetch {
    delay: Duration,
    fail_with: Option<String>,
    executions: Arc<AtomicUsize>,
}

impl SimulatedFetch {
    pub fn new(cfg: &DemoConfig) -> Self {
        Self {
            delay: cfg.delay,
            fail_with: cfg.fail_with.clone(),
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of started executions.
    pub fn executions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.executions)
    }
}

impl Command<String> for SimulatedFetch {
    fn execute(&self) -> BoxCommandFuture<'_, String> {
        Box::pin(async move {
            let n = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(execution = n, delay = ?self.delay, "simulated fetch started");
            sleep(self.delay).await;

            match &self.fail_with {
                Some(msg) => Err(anyhow::anyhow!("{msg}")),
                None => Ok(format!("response #{n}")),
            }
        })
    }
}

/// Fire bursts of `try_run` calls and wait for each burst to settle.
///
/// Each round fires `cfg.triggers` calls spaced by `cfg.trigger_interval`,
/// waits until the runner is quiet again, and resets it before the next
/// round. Returns the outcome each round ended with.
pub async fn drive_demo(
    runner: &CommandRunner<String>,
    cfg: &DemoConfig,
) -> anyhow::Result<Vec<CommandState<String>>> {
    let mut rx = runner.subscribe();
    let mut outcomes = Vec::with_capacity(cfg.rounds);

    for round in 1..=cfg.rounds {
        info!(round, triggers = cfg.triggers, "starting round");
        for _ in 0..cfg.triggers {
            runner.try_run();
            sleep(cfg.trigger_interval).await;
        }

        let settled = settle_round(runner, &mut rx, cfg).await?;
        println!("round {round}: {}", describe(&settled));
        outcomes.push(settled);

        if round < cfg.rounds {
            runner.reset();
        }
    }

    Ok(outcomes)
}

/// Wait for a finished outcome with no execution still pending.
///
/// A trailing trigger from the burst may start one more execution after the
/// first outcome lands; resetting before it finishes would leak its result
/// into the next round.
async fn settle_round(
    runner: &CommandRunner<String>,
    rx: &mut watch::Receiver<CommandState<String>>,
    cfg: &DemoConfig,
) -> anyhow::Result<CommandState<String>> {
    let quiet = cfg.trigger_interval.max(Duration::from_millis(1));
    loop {
        rx.wait_for(|state| state.has_value() || state.has_failed())
            .await?;
        sleep(quiet).await;
        if !runner.is_running() {
            let settled = runner.state();
            debug!(state = settled.name(), "round settled");
            return Ok(settled);
        }
    }
}

pub fn describe(state: &CommandState<String>) -> String {
    match state {
        CommandState::Success(value) => format!("success ({value})"),
        other => other.to_string(),
    }
}
