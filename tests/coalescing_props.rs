// tests/coalescing_props.rs

use proptest::prelude::*;

use command_runner::{CommandRunner, CommandState, host};
use command_runner_test_utils::GatedCommand;

#[derive(Debug, Clone)]
enum Op {
    /// A burst of `n` try_run calls.
    TryRun(usize),
    /// Complete the in-flight execution with a value.
    Release(u32),
    /// Complete the in-flight execution with an error.
    Fail,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..8usize).prop_map(Op::TryRun),
        any::<u32>().prop_map(Op::Release),
        Just(Op::Fail),
        Just(Op::Reset),
    ]
}

/// What the runner should look like after each step.
#[derive(Debug, Default)]
struct Model {
    busy: bool,
    executions: usize,
    state: &'static str,
    value: Option<u32>,
}

async fn yield_many() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn executions_match_a_single_slot_model(ops in proptest::collection::vec(op_strategy(), 1..24)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let (command, gate) = GatedCommand::<u32>::new();
            let runner = CommandRunner::new(command).into_shared();
            let handle = host::spawn(runner.clone());
            yield_many().await;

            let mut model = Model { state: "idle", ..Model::default() };

            for op in ops {
                match op {
                    Op::TryRun(n) => {
                        for _ in 0..n {
                            runner.try_run();
                        }
                        if !model.busy {
                            model.busy = true;
                            model.executions += 1;
                            model.state = "running";
                        }
                    }
                    // Releasing with nothing in flight would pre-complete
                    // the next execution, so only release when busy.
                    Op::Release(v) if model.busy => {
                        gate.release(v);
                        model.busy = false;
                        model.state = "success";
                        model.value = Some(v);
                    }
                    Op::Fail if model.busy => {
                        gate.fail("boom");
                        model.busy = false;
                        model.state = "failure";
                    }
                    Op::Release(_) | Op::Fail => {}
                    Op::Reset => {
                        runner.reset();
                        model.state = "idle";
                    }
                }
                yield_many().await;

                let state = runner.state();
                assert_eq!(gate.executions(), model.executions);
                assert_eq!(gate.max_in_flight(), 1.min(model.executions));
                assert_eq!(state.name(), model.state);
                if let CommandState::Success(v) = state {
                    assert_eq!(Some(v), model.value);
                }
            }

            handle.shutdown().await.unwrap();
        });
    }
}
