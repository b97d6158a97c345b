use std::collections::VecDeque;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use frontier_core::Task;

use crate::{CancelToken, SharedAccumulator, TaskQueue};

/// Turns full accumulator batches into queued tasks.
///
/// A drained batch is held until the queue accepts it; nothing new is drained
/// while one is waiting. `reserve` slots are left free so that workers can
/// always re-enqueue their follow-up tasks.
pub struct BatchDispatcher {
    accumulator: SharedAccumulator,
    queue: TaskQueue,
    reserve: usize,
    idle_poll: Duration,
    full_queue_pause: Duration,
}

impl BatchDispatcher {
    pub fn new(
        accumulator: SharedAccumulator,
        queue: TaskQueue,
        reserve: usize,
        idle_poll: Duration,
        full_queue_pause: Duration,
    ) -> Self {
        Self {
            accumulator,
            queue,
            reserve,
            idle_poll,
            full_queue_pause,
        }
    }

    pub fn run(&self, cancel: &CancelToken) {
        let mut held: VecDeque<Task> = VecDeque::new();
        while !cancel.is_cancelled() {
            if held.is_empty() {
                held.extend(self.accumulator.drain_round());
            }
            let Some(task) = held.pop_front() else {
                cancel.sleep(self.idle_poll);
                continue;
            };

            let (kind, len) = (task.kind(), task.len());
            match self.queue.offer(task, self.reserve) {
                Ok(()) => engine_debug!("queued {kind} batch of {len}"),
                Err(task) => {
                    held.push_front(task);
                    engine_debug!(
                        "queue full ({}/{}), holding {} batch(es)",
                        self.queue.len(),
                        self.queue.capacity(),
                        held.len()
                    );
                    cancel.sleep(self.full_queue_pause);
                }
            }
        }

        if !held.is_empty() {
            engine_info!("returning {} undispatched batch(es)", held.len());
        }
        for task in held {
            self.accumulator.restore(task);
        }
    }
}
