//! Error types for the simulation core
//!
//! Two layers:
//! - [`SchedulerError`] for the worker pool (misuse and task failure)
//! - [`SimError`] for the simulation boundary (bad inputs, failed frames)
//!
//! Capacity exhaustion in the particle store is not an error, it is reported
//! through plain `bool`/count returns.

/// Failures raised by [`crate::ThreadPool`]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("thread pool needs at least one worker")]
    ZeroWorkers,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("submit on a thread pool that is shutting down")]
    ShuttingDown,
    #[error("task panicked: {0}")]
    TaskPanicked(String),
    #[error("task was dropped before it produced a result")]
    TaskLost,
}

/// Failures raised at the simulation boundary
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f64),
    #[error("body mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

pub type SimResult<T> = Result<T, SimError>;
