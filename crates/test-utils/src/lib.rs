pub mod builders;
pub mod gated_command;

use std::sync::Once;

use command_runner::{CommandRunner, CommandState};
use tracing_subscriber::{EnvFilter, fmt};

pub use gated_command::{Gate, GatedCommand};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Wait (bounded by [`with_timeout`]) until the runner's state matches
/// `pred`, and return that state.
pub async fn wait_for_state<T>(
    runner: &CommandRunner<T>,
    pred: impl FnMut(&CommandState<T>) -> bool,
) -> CommandState<T>
where
    T: Clone + Send + Sync + 'static,
{
    with_timeout(async {
        let mut rx = runner.subscribe();
        let state = rx.wait_for(pred).await.expect("state channel closed").clone();
        state
    })
    .await
}

/// Give spawned tasks a chance to run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}
