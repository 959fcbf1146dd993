// tests/demo_run.rs

use std::sync::atomic::Ordering;
use std::time::Duration;

use command_runner::CommandRunner;
use command_runner::cli::CliArgs;
use command_runner::config::{DemoConfig, RunnerConfig};
use command_runner::demo::{SimulatedFetch, drive_demo};
use command_runner::host;
use command_runner_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn demo_config(fail_with: Option<&str>) -> DemoConfig {
    DemoConfig {
        delay: Duration::from_millis(200),
        fail_with: fail_with.map(str::to_string),
        triggers: 5,
        trigger_interval: Duration::from_millis(1),
        rounds: 3,
    }
}

#[tokio::test(start_paused = true)]
async fn each_burst_of_triggers_runs_once() -> TestResult {
    init_tracing();

    let cfg = demo_config(None);
    let fetch = SimulatedFetch::new(&cfg);
    let executions = fetch.executions();
    let runner = CommandRunner::with_config(RunnerConfig::named("demo"), fetch).into_shared();
    let handle = host::spawn(runner.clone());

    drive_demo(&runner, &cfg).await?;

    assert_eq!(executions.load(Ordering::SeqCst), 3);
    assert_eq!(runner.require()?, "response #3");

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_demo_still_completes_every_round() -> TestResult {
    init_tracing();

    let cfg = demo_config(Some("offline"));
    let fetch = SimulatedFetch::new(&cfg);
    let executions = fetch.executions();
    let runner = CommandRunner::new(fetch).into_shared();
    let handle = host::spawn(runner.clone());

    drive_demo(&runner, &cfg).await?;

    assert_eq!(executions.load(Ordering::SeqCst), 3);
    assert!(runner.has_failed());
    assert_eq!(
        runner.state().error().map(|e| e.to_string()),
        Some("offline".to_string())
    );

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn trailing_execution_stays_in_its_own_round() -> TestResult {
    init_tracing();

    // Bursts outlast the delay, so every round runs two executions and the
    // second one is still in flight when the first outcome lands.
    let cfg = DemoConfig {
        delay: Duration::from_millis(50),
        fail_with: None,
        triggers: 4,
        trigger_interval: Duration::from_millis(20),
        rounds: 3,
    };
    let fetch = SimulatedFetch::new(&cfg);
    let executions = fetch.executions();
    let runner = CommandRunner::new(fetch).into_shared();
    let handle = host::spawn(runner.clone());

    let outcomes = drive_demo(&runner, &cfg).await?;

    let values: Vec<_> = outcomes
        .iter()
        .map(|state| state.value().cloned())
        .collect();
    assert_eq!(
        values,
        vec![
            Some("response #2".to_string()),
            Some("response #4".to_string()),
            Some("response #6".to_string()),
        ]
    );
    assert_eq!(executions.load(Ordering::SeqCst), 6);

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn dry_run_only_validates() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    std::io::Write::write_all(&mut file, b"[runner]\nname = \"dry\"\n")?;

    let args = CliArgs {
        config: file.path().to_string_lossy().into_owned(),
        log_level: None,
        fail: None,
        dry_run: true,
    };
    command_runner::run(args).await?;
    Ok(())
}
