use crate::{CrawlError, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffSignal {
    Success,
    /// Sleep for the current delay, then grow it.
    Failure,
}

/// Side effects a worker performs, in order, after a task completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Enqueue(Task),
    /// Wait before revisiting a chain that has not advanced.
    CoolDown,
    Backoff(BackoffSignal),
    /// Retryable problem worth reporting; the work has already been re-queued.
    Warn(CrawlError),
    /// Stop the whole run.
    Halt(CrawlError),
}
