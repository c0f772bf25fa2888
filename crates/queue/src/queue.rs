//! Serialized retry queue
//!
//! Wraps arbitrary async tasks (typically a manager commit) in a
//! bounded-retry discipline and executes them strictly one at a time in
//! FIFO submission order. The queue is the only synchronization the
//! coordinator needs: as long as every mutation is funneled through it,
//! no two apply callbacks ever overlap.
//!
//! ## Execution model
//!
//! One drain worker per queue, started lazily on enqueue and guarded by a
//! single atomic flag so at most one runs at any time. The worker pops
//! and awaits exactly one task to full completion (success or retry
//! exhaustion) before touching the next; a task's exhaustion never halts
//! the drain of the tasks behind it. Backoff is an explicit sleep between
//! attempts, linear in the attempt number.

use parking_lot::Mutex;
use redline_core::{Error, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Retry policy for queued tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Total attempts per task, including the first (minimum 1)
    pub max_retries: u32,
    /// Base backoff unit; the wait before attempt n+1 is `retry_delay × n`
    pub retry_delay: Duration,
}

impl QueueConfig {
    /// Create a policy; a zero `max_retries` is treated as 1
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type TaskFn = Box<dyn Fn() -> TaskFuture + Send + Sync>;

struct QueuedTask {
    run: TaskFn,
    done: oneshot::Sender<Result<()>>,
}

struct QueueInner {
    pending: Mutex<VecDeque<QueuedTask>>,
    draining: AtomicBool,
    config: QueueConfig,
}

/// Resolves once the corresponding task finally succeeds, exhausts its
/// retries, or is removed by [`TransactionQueue::clear`]
pub struct Completion {
    rx: oneshot::Receiver<Result<()>>,
}

impl Future for Completion {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            // Sender dropped without a verdict: the task was cleared
            // before it started.
            Err(_) => Err(Error::QueueCleared),
        })
    }
}

/// FIFO execution discipline with bounded retry and linear backoff
///
/// Tasks are re-invocable closures; a failed attempt is retried by calling
/// the closure again after the backoff sleep. The queue gives no priority
/// or reordering mechanism, and imposes no timeout on tasks: a hung task
/// stalls the whole queue, by contract with the callback supplier.
///
/// Cloning is cheap and shares the same queue.
#[derive(Clone)]
pub struct TransactionQueue {
    inner: Arc<QueueInner>,
}

impl TransactionQueue {
    /// Create a queue with the default retry policy (3 attempts, 1s base
    /// backoff)
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Create a queue with an explicit retry policy
    pub fn with_config(config: QueueConfig) -> Self {
        TransactionQueue {
            inner: Arc::new(QueueInner {
                pending: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                config: QueueConfig::new(config.max_retries, config.retry_delay),
            }),
        }
    }

    /// Append a task and start draining if no worker is running
    ///
    /// Must be called within a tokio runtime. The returned [`Completion`]
    /// resolves with the task's final outcome; dropping it detaches the
    /// caller without affecting execution.
    pub fn enqueue<F, Fut>(&self, task: F) -> Completion
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (done, rx) = oneshot::channel();
        let run: TaskFn = Box::new(move || Box::pin(task()) as TaskFuture);
        self.inner.pending.lock().push_back(QueuedTask { run, done });
        self.try_start_drain();
        Completion { rx }
    }

    /// Number of tasks waiting to start (the in-flight task excluded)
    pub fn len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Whether no tasks are waiting to start
    pub fn is_empty(&self) -> bool {
        self.inner.pending.lock().is_empty()
    }

    /// Whether a drain worker is currently alive
    pub fn is_processing(&self) -> bool {
        self.inner.draining.load(Ordering::SeqCst)
    }

    /// Drop every task that has not yet started; returns how many
    ///
    /// Their completions resolve with [`Error::QueueCleared`]. The
    /// in-flight task, if any, already left the queue and runs to its own
    /// completion or exhaustion.
    pub fn clear(&self) -> usize {
        // Dropping the removed tasks drops their senders, which resolves
        // the receivers with QueueCleared.
        let removed: Vec<QueuedTask> = self.inner.pending.lock().drain(..).collect();
        removed.len()
    }

    fn try_start_drain(&self) {
        if self
            .inner
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(drain(inner));
        }
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain loop: one task at a time, FIFO, until the queue is empty
async fn drain(inner: Arc<QueueInner>) {
    loop {
        let task = inner.pending.lock().pop_front();
        match task {
            Some(task) => run_with_retry(task, inner.config).await,
            None => {
                inner.draining.store(false, Ordering::SeqCst);
                // An enqueue may have raced the flag clear; take the
                // drain back or leave it to the racer.
                if inner.pending.lock().is_empty() {
                    break;
                }
                if inner
                    .draining
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    break;
                }
            }
        }
    }
}

/// Run one task to success or retry exhaustion
async fn run_with_retry(task: QueuedTask, config: QueueConfig) {
    let mut last_error = String::new();
    for attempt in 1..=config.max_retries {
        match (task.run)().await {
            Ok(()) => {
                let _ = task.done.send(Ok(()));
                return;
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < config.max_retries {
                    let backoff = config.retry_delay * attempt;
                    tracing::warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "task attempt failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                } else {
                    tracing::error!(
                        attempts = config.max_retries,
                        error = %e,
                        "task failed, retries exhausted"
                    );
                }
            }
        }
    }
    let _ = task.done.send(Err(Error::RetriesExhausted {
        attempts: config.max_retries,
        last_error,
    }));
}
