//! Fixed-size worker pool with a single shared FIFO queue
//!
//! Workers block on one condition variable ("queue non-empty or stopping") and
//! signal a second one ("queue empty and nothing in flight") which backs
//! [`ThreadPool::wait_for_all`].
//!
//! - [`ThreadPool::submit`] queues a `'static` closure and hands back a [`TaskHandle`]
//! - [`ThreadPool::parallel_map`] and [`ThreadPool::parallel_for_each`] are fork-join
//!   over owned items; every item moves into its task and comes back through the
//!   task's handle
//!
//! A panicking task never takes its worker down. The panic is caught, reported
//! through the task's handle and recorded so the next `wait_for_all` fails.

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::error::SchedulerError;

type Work = Box<dyn FnOnce() + Send + 'static>;

struct Job {
    id: u64,
    work: Work,
}

struct QueueState {
    tasks: VecDeque<Job>,
    active: usize,
    stopping: bool,
    next_id: u64,
    failures: Vec<(u64, String)>, // (task id, panic message)
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar, // queue non-empty or stopping
    finished: Condvar,  // queue empty and no active task
}

pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl ThreadPool {
    /// Spawn `num_threads` workers
    pub fn new(num_threads: usize) -> Result<Self, SchedulerError> {
        if num_threads == 0 {
            return Err(SchedulerError::ZeroWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                active: 0,
                stopping: false,
                next_id: 0,
                failures: Vec::new(),
            }),
            available: Condvar::new(),
            finished: Condvar::new(),
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(num_threads)),
            num_threads,
        };

        for i in 0..num_threads {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("galsim-worker-{i}"))
                .spawn(move || worker_loop(shared));

            match handle {
                Ok(handle) => pool.workers.lock().push(handle),
                Err(e) => {
                    // already-spawned workers are stopped and joined when `pool` drops
                    return Err(SchedulerError::Spawn(e));
                }
            }
        }

        info!("ThreadPool created with {} threads", num_threads);
        Ok(pool)
    }

    /// Spawn one worker per available hardware thread (at least one)
    pub fn with_available_parallelism() -> Result<Self, SchedulerError> {
        let n = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(n)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Queue `func` and return a handle to its eventual result
    ///
    /// Fails with [`SchedulerError::ShuttingDown`] once [`ThreadPool::shutdown`] has begun.
    pub fn submit<F, R>(&self, func: F) -> Result<TaskHandle<R>, SchedulerError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = Arc::new(Slot::new());
        let completer = Completer { slot: Arc::clone(&slot) };
        let shared = Arc::clone(&self.shared);

        let id = {
            let mut state = self.shared.state.lock();
            if state.stopping {
                return Err(SchedulerError::ShuttingDown);
            }
            let id = state.next_id;
            state.next_id += 1;

            let work: Work = Box::new(move || {
                match panic::catch_unwind(AssertUnwindSafe(func)) {
                    Ok(value) => completer.complete(Ok(value)),
                    Err(payload) => {
                        let msg = panic_message(payload.as_ref());
                        error!("task {} panicked: {}", id, msg);
                        // recorded before the handle is released so `parallel_map`
                        // can always find and clear its own failures
                        shared.state.lock().failures.push((id, msg.clone()));
                        completer.complete(Err(SchedulerError::TaskPanicked(msg)));
                    }
                }
            });
            state.tasks.push_back(Job { id, work });
            id
        };

        self.shared.available.notify_one();
        Ok(TaskHandle { id, slot })
    }

    /// Run `func` on every item on the pool and block until all of them have finished
    ///
    /// Outcomes come back in input order, one per item. An item the pool refused
    /// (shutdown) gets `Err(ShuttingDown)`. Panics from these tasks are reported
    /// here and not again by `wait_for_all`.
    pub fn parallel_map<T, R, F>(&self, items: Vec<T>, func: F) -> Vec<Result<R, SchedulerError>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let func = Arc::new(func);
        let submitted: Vec<Result<TaskHandle<R>, SchedulerError>> = items
            .into_iter()
            .map(|item| {
                let func = Arc::clone(&func);
                self.submit(move || (*func)(item))
            })
            .collect();

        let ids: HashSet<u64> = submitted.iter().flatten().map(TaskHandle::id).collect();
        let outcomes: Vec<Result<R, SchedulerError>> = submitted
            .into_iter()
            .map(|handle| handle.and_then(TaskHandle::join))
            .collect();

        if outcomes.iter().any(Result::is_err) {
            self.shared
                .state
                .lock()
                .failures
                .retain(|(id, _)| !ids.contains(id));
        }
        outcomes
    }

    /// Run `func` once per element of `items` on the pool, block until all of
    /// them have finished and hand the items back in order
    ///
    /// Returns the first failure (submit refused or task panicked).
    pub fn parallel_for_each<T, F>(&self, items: Vec<T>, func: F) -> Result<Vec<T>, SchedulerError>
    where
        T: Send + 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.parallel_map(items, move |mut item| {
            func(&mut item);
            item
        })
        .into_iter()
        .collect()
    }

    /// Block until the queue is empty and no worker is mid-task
    ///
    /// Reports (and clears) panics from tasks that finished since the previous call.
    pub fn wait_for_all(&self) -> Result<(), SchedulerError> {
        let mut state = self.shared.state.lock();
        while !(state.tasks.is_empty() && state.active == 0) {
            self.shared.finished.wait(&mut state);
        }

        if state.failures.is_empty() {
            return Ok(());
        }
        let msgs: Vec<String> = state.failures.drain(..).map(|(_, m)| m).collect();
        Err(SchedulerError::TaskPanicked(msgs.join("; ")))
    }

    /// Queued plus in-flight tasks; for diagnostics only
    pub fn pending_task_count(&self) -> usize {
        let state = self.shared.state.lock();
        state.tasks.len() + state.active
    }

    /// Stop accepting work, let workers drain what is already queued, then join them
    ///
    /// Idempotent. Must not be called from inside a task.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.stopping && self.workers.lock().is_empty() {
                return;
            }
            state.stopping = true;
        }
        self.shared.available.notify_all();

        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for worker in workers {
            if worker.join().is_err() {
                warn!("worker thread exited abnormally");
            }
        }
        info!("ThreadPool destroyed");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            while !state.stopping && state.tasks.is_empty() {
                shared.available.wait(&mut state);
            }
            match state.tasks.pop_front() {
                Some(job) => {
                    state.active += 1;
                    job
                }
                // stopping and drained
                None => return,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(job.work));

        let mut state = shared.state.lock();
        state.active -= 1;
        if let Err(payload) = outcome {
            let msg = panic_message(payload.as_ref());
            error!("task {} panicked: {}", job.id, msg);
            state.failures.push((job.id, msg));
        }
        if state.tasks.is_empty() && state.active == 0 {
            shared.finished.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =========================================================================================
// Task handles
// =========================================================================================

struct Slot<T> {
    value: Mutex<Option<Result<T, SchedulerError>>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        }
    }
}

/// Producer side of a [`TaskHandle`]; fills the slot with `TaskLost` if the
/// task is dropped without running
struct Completer<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Completer<T> {
    fn complete(&self, result: Result<T, SchedulerError>) {
        let mut value = self.slot.value.lock();
        if value.is_none() {
            *value = Some(result);
            self.slot.ready.notify_all();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        let mut value = self.slot.value.lock();
        if value.is_none() {
            debug!("task dropped before completion");
            *value = Some(Err(SchedulerError::TaskLost));
            self.slot.ready.notify_all();
        }
    }
}

/// Handle to the result of a submitted task
pub struct TaskHandle<T> {
    id: u64,
    slot: Arc<Slot<T>>,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the task has finished, without taking the result
    pub fn wait(&self) {
        let mut value = self.slot.value.lock();
        while value.is_none() {
            self.slot.ready.wait(&mut value);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.slot.value.lock().is_some()
    }

    /// Block until the task has finished and take its result
    pub fn join(self) -> Result<T, SchedulerError> {
        let mut value = self.slot.value.lock();
        loop {
            if let Some(result) = value.take() {
                return result;
            }
            self.slot.ready.wait(&mut value);
        }
    }
}
