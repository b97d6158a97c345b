use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use frontier_core::Task;

use crate::CancelToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bounded multi-producer/multi-consumer task queue.
///
/// Capacity is the only backpressure in the engine: producers block while it
/// is full and nothing is ever dropped, except when the run is cancelled.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
    capacity: usize,
}

impl TaskQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    /// Blocks until the task fits. Hands the task back if cancelled meanwhile.
    pub fn push(&self, mut task: Task, cancel: &CancelToken) -> Result<(), Task> {
        loop {
            if cancel.is_cancelled() {
                return Err(task);
            }
            match self.tx.send_timeout(task, POLL_INTERVAL) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(back)) => task = back,
                Err(SendTimeoutError::Disconnected(back)) => return Err(back),
            }
        }
    }

    /// Enqueues without blocking, and only if `reserve` slots stay free afterwards.
    pub fn offer(&self, task: Task, reserve: usize) -> Result<(), Task> {
        if self.len() + reserve >= self.capacity {
            return Err(task);
        }
        self.tx.try_send(task).map_err(|err| err.into_inner())
    }

    /// Waits for the next task; `None` once cancelled.
    pub fn pop(&self, cancel: &CancelToken) -> Option<Task> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(task) => return Some(task),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Removes everything still queued without waiting.
    pub fn drain(&self) -> Vec<Task> {
        self.rx.try_iter().collect()
    }
}
