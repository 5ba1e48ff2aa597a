//! # Bounded Worker Pool
//!
//! Fixed set of threads draining one bounded FIFO queue.
//!
//! ```text
//! Idle ──start()──▶ Running ──stop()──▶ Stopped
//!   └──────────────stop()──────────────────▲
//! ```
//!
//! - `enqueue` blocks only while the queue is full and fails with
//!   `Terminated` once the pool is stopped. `enqueue_async` waits for space
//!   without blocking the executor; `try_enqueue` never waits.
//! - `stop` wakes every blocked producer, lets workers drain what is already
//!   queued, then joins them. Tasks queued on a pool that never started are
//!   run on the stopping thread, so every accepted task runs exactly once.
//! - A panicking handler is logged and the worker moves on to the next task.
//! - No ordering is guaranteed between tasks handled by different workers.

use crate::domain::{AdmissionError, Result};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::Notify;

/// Lifecycle state of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    /// Constructed, workers not spawned.
    Idle,
    /// Workers draining the queue.
    Running,
    /// Shutdown signaled.
    Stopped,
}

/// Task refused by `try_enqueue`.
#[derive(Debug, PartialEq, Eq)]
pub enum TryEnqueueError<T> {
    /// Queue at capacity; the task is handed back.
    Full(T),
    /// Pool stopped.
    Terminated,
}

struct Queue<T> {
    tasks: VecDeque<T>,
    state: PoolState,
}

struct Shared<T> {
    queue: Mutex<Queue<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    /// Wakes async producers when a slot frees or the pool stops.
    space: Notify,
    capacity: usize,
}

type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;
type QueueGauge = Arc<dyn Fn(usize) + Send + Sync>;

/// Generic bounded-queue thread pool.
pub struct WorkerPool<T: Send + 'static> {
    name: String,
    shared: Arc<Shared<T>>,
    handler: Handler<T>,
    gauge: Option<QueueGauge>,
    threads: usize,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Create an idle pool. `threads` and `capacity` are raised to at least 1.
    pub fn new(
        name: impl Into<String>,
        threads: usize,
        capacity: usize,
        handler: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    tasks: VecDeque::with_capacity(capacity.max(1)),
                    state: PoolState::Idle,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                space: Notify::new(),
                capacity: capacity.max(1),
            }),
            handler: Arc::new(handler),
            gauge: None,
            threads: threads.max(1),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Report the queue length after every push and pop.
    ///
    /// `gauge` runs with the queue lock held, so successive reports are
    /// ordered and the last one matches the queue.
    pub fn with_queue_gauge(mut self, gauge: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.gauge = Some(Arc::new(gauge));
        self
    }

    /// Spawn the workers. No-op unless the pool is idle.
    pub fn start(&self) {
        {
            let mut queue = self.shared.queue.lock();
            if queue.state != PoolState::Idle {
                tracing::warn!(pool = %self.name, state = ?queue.state, "Worker pool already started or stopped");
                return;
            }
            queue.state = PoolState::Running;
        }

        let mut handles = self.handles.lock();
        for i in 0..self.threads {
            let worker = Worker {
                name: self.name.clone(),
                shared: Arc::clone(&self.shared),
                handler: Arc::clone(&self.handler),
                gauge: self.gauge.clone(),
            };
            let spawned = std::thread::Builder::new()
                .name(format!("{}-{}", self.name, i))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => tracing::error!(pool = %self.name, error = %e, "Failed to spawn worker"),
            }
        }
        tracing::debug!(pool = %self.name, threads = handles.len(), "Worker pool started");
    }

    /// Signal shutdown, drain queued tasks and join the workers.
    pub fn stop(&self) {
        let leftover = {
            let mut queue = self.shared.queue.lock();
            if queue.state == PoolState::Stopped {
                return;
            }
            let was_idle = queue.state == PoolState::Idle;
            queue.state = PoolState::Stopped;
            if was_idle {
                let leftover = std::mem::take(&mut queue.tasks);
                self.report_len(0);
                leftover
            } else {
                VecDeque::new()
            }
        };
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
        self.shared.space.notify_waiters();

        for task in leftover {
            run_task(&self.name, &self.handler, task);
        }

        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!(pool = %self.name, "Worker panicked");
            }
        }
        tracing::debug!(pool = %self.name, "Worker pool stopped");
    }

    /// Queue a task, blocking while the queue is full.
    ///
    /// # Errors
    /// * `AdmissionError::Terminated` - pool stopped before the task was queued
    pub fn enqueue(&self, task: T) -> Result<()> {
        let mut queue = self.shared.queue.lock();
        loop {
            if queue.state == PoolState::Stopped {
                return Err(AdmissionError::Terminated);
            }
            if queue.tasks.len() < self.shared.capacity {
                break;
            }
            self.shared.not_full.wait(&mut queue);
        }
        queue.tasks.push_back(task);
        self.report_len(queue.tasks.len());
        drop(queue);

        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Queue a task if there is room, without waiting.
    pub fn try_enqueue(&self, task: T) -> std::result::Result<(), TryEnqueueError<T>> {
        let mut queue = self.shared.queue.lock();
        if queue.state == PoolState::Stopped {
            return Err(TryEnqueueError::Terminated);
        }
        if queue.tasks.len() >= self.shared.capacity {
            return Err(TryEnqueueError::Full(task));
        }
        queue.tasks.push_back(task);
        self.report_len(queue.tasks.len());
        drop(queue);

        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Queue a task, yielding to the executor while the queue is full.
    ///
    /// # Errors
    /// * `AdmissionError::Terminated` - pool stopped before the task was queued
    pub async fn enqueue_async(&self, mut task: T) -> Result<()> {
        loop {
            // Register before checking so a slot freed in between still wakes us.
            let notified = self.shared.space.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();

            match self.try_enqueue(task) {
                Ok(()) => return Ok(()),
                Err(TryEnqueueError::Terminated) => return Err(AdmissionError::Terminated),
                Err(TryEnqueueError::Full(returned)) => {
                    task = returned;
                    notified.await;
                }
            }
        }
    }

    /// Queue is more than half full.
    pub fn overloaded(&self) -> bool {
        self.len() > self.shared.capacity / 2
    }

    /// Tasks waiting in the queue.
    pub fn len(&self) -> usize {
        self.shared.queue.lock().tasks.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.queue.lock().state
    }

    fn report_len(&self, len: usize) {
        if let Some(gauge) = &self.gauge {
            gauge(len);
        }
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker<T> {
    name: String,
    shared: Arc<Shared<T>>,
    handler: Handler<T>,
    gauge: Option<QueueGauge>,
}

impl<T> Worker<T> {
    fn run(self) {
        loop {
            let task = {
                let mut queue = self.shared.queue.lock();
                loop {
                    if let Some(task) = queue.tasks.pop_front() {
                        if let Some(gauge) = &self.gauge {
                            gauge(queue.tasks.len());
                        }
                        break Some(task);
                    }
                    if queue.state == PoolState::Stopped {
                        break None;
                    }
                    self.shared.not_empty.wait(&mut queue);
                }
            };

            match task {
                Some(task) => {
                    self.shared.not_full.notify_one();
                    self.shared.space.notify_waiters();
                    run_task(&self.name, &self.handler, task);
                }
                None => return,
            }
        }
    }
}

/// Run one task; a panic is logged instead of unwinding the worker.
fn run_task<T>(pool: &str, handler: &Handler<T>, task: T) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(task))) {
        tracing::error!(pool = %pool, panic = %panic_message(payload.as_ref()), "Task handler panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
