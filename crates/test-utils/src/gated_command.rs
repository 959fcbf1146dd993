use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use command_runner::exec::{BoxCommandFuture, Command};
use tokio::sync::{Mutex, mpsc, watch};

/// Counters shared between a [`GatedCommand`] and its [`Gate`].
#[derive(Debug)]
struct Counters {
    started: watch::Sender<usize>,
    completed: AtomicUsize,
    abandoned: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// A fake command that:
/// - records every execution it starts
/// - only completes when the test releases it through the paired [`Gate`]
/// - notices when the runner drops it before completion (cancellation).
pub struct GatedCommand<T> {
    outcomes: Mutex<mpsc::UnboundedReceiver<anyhow::Result<T>>>,
    counters: Arc<Counters>,
}

/// Test-side handle controlling a [`GatedCommand`].
#[derive(Debug, Clone)]
pub struct Gate<T> {
    outcomes: mpsc::UnboundedSender<anyhow::Result<T>>,
    counters: Arc<Counters>,
}

impl<T> GatedCommand<T>
where
    T: Send + 'static,
{
    pub fn new() -> (Self, Gate<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (started, _) = watch::channel(0);
        let counters = Arc::new(Counters {
            started,
            completed: AtomicUsize::new(0),
            abandoned: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let command = Self {
            outcomes: Mutex::new(rx),
            counters: Arc::clone(&counters),
        };
        let gate = Gate {
            outcomes: tx,
            counters,
        };
        (command, gate)
    }
}

/// Tracks one execution; counts it as abandoned if dropped unfinished.
struct InFlight<'a> {
    counters: &'a Counters,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        if !self.finished {
            self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl<T> Command<T> for GatedCommand<T>
where
    T: Send + 'static,
{
    fn execute(&self) -> BoxCommandFuture<'_, T> {
        Box::pin(async move {
            let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let mut in_flight = InFlight {
                counters: &self.counters,
                finished: false,
            };
            self.counters.started.send_modify(|n| *n += 1);

            let outcome = {
                let mut rx = self.outcomes.lock().await;
                rx.recv().await
            };

            in_flight.finished = true;
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
            outcome.unwrap_or_else(|| Err(anyhow::anyhow!("gate dropped")))
        })
    }
}

impl<T> Gate<T> {
    /// Let the current (or next) execution return `value`.
    pub fn release(&self, value: T) {
        let _ = self.outcomes.send(Ok(value));
    }

    /// Let the current (or next) execution fail with `msg`.
    pub fn fail(&self, msg: &str) {
        let _ = self.outcomes.send(Err(anyhow::anyhow!("{msg}")));
    }

    /// Let the current (or next) execution fail with an arbitrary error.
    pub fn fail_with(&self, err: anyhow::Error) {
        let _ = self.outcomes.send(Err(err));
    }

    /// Number of executions started so far.
    pub fn executions(&self) -> usize {
        *self.counters.started.borrow()
    }

    pub fn completed(&self) -> usize {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Executions whose future was dropped before it finished.
    pub fn abandoned(&self) -> usize {
        self.counters.abandoned.load(Ordering::SeqCst)
    }

    /// Highest number of executions ever observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` executions have started.
    pub async fn wait_started(&self, n: usize) {
        let mut rx = self.counters.started.subscribe();
        rx.wait_for(|started| *started >= n)
            .await
            .expect("started counter closed");
    }
}
