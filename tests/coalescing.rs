// tests/coalescing.rs

use std::sync::Arc;

use command_runner::{CommandRunner, CommandState, host};
use command_runner_test_utils::{GatedCommand, init_tracing, settle, wait_for_state, with_timeout};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn triggers_while_running_are_dropped() -> TestResult {
    init_tracing();

    let (command, gate) = GatedCommand::<&'static str>::new();
    let runner = CommandRunner::new(command).into_shared();
    let handle = host::spawn(runner.clone());

    runner.try_run();
    with_timeout(gate.wait_started(1)).await;
    assert!(runner.is_running());
    assert_eq!(gate.executions(), 1);

    // Click again while the first execution is pending: ignored.
    for _ in 0..5 {
        runner.try_run();
    }
    settle().await;
    assert_eq!(gate.executions(), 1);

    gate.release("X");
    let state = wait_for_state(&runner, CommandState::has_value).await;
    assert_eq!(state.value(), Some(&"X"));

    // Nothing was queued by the dropped triggers.
    settle().await;
    assert_eq!(gate.executions(), 1);
    assert!(runner.has_value());

    // Now idle again, so the next trigger starts a second execution.
    runner.try_run();
    with_timeout(gate.wait_started(2)).await;
    assert_eq!(gate.executions(), 2);
    assert!(runner.is_running());

    gate.release("Y");
    wait_for_state(&runner, |s| s.value() == Some(&"Y")).await;

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn triggers_before_the_loop_starts_collapse_into_one() -> TestResult {
    init_tracing();

    let (command, gate) = GatedCommand::<u32>::new();
    let runner = CommandRunner::new(command).into_shared();

    // The slot holds one token; the rest are coalesced.
    for _ in 0..10 {
        runner.try_run();
    }

    let handle = host::spawn(runner.clone());
    with_timeout(gate.wait_started(1)).await;
    gate.release(1);
    wait_for_state(&runner, CommandState::has_value).await;

    settle().await;
    assert_eq!(gate.executions(), 1);

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_never_overlap_executions() -> TestResult {
    init_tracing();

    let (command, gate) = GatedCommand::<usize>::new();
    let runner = CommandRunner::new(command).into_shared();
    let handle = host::spawn(runner.clone());

    runner.try_run();
    with_timeout(gate.wait_started(1)).await;

    let mut callers = Vec::new();
    for _ in 0..16 {
        let runner = Arc::clone(&runner);
        callers.push(tokio::spawn(async move {
            for _ in 0..200 {
                runner.try_run();
                tokio::task::yield_now().await;
            }
        }));
    }
    for caller in callers {
        caller.await?;
    }

    assert_eq!(gate.executions(), 1);
    assert_eq!(gate.max_in_flight(), 1);

    gate.release(42);
    wait_for_state(&runner, CommandState::has_value).await;
    settle().await;

    assert_eq!(gate.executions(), 1);
    assert_eq!(gate.max_in_flight(), 1);

    handle.shutdown().await?;
    Ok(())
}
