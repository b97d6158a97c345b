use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use engine_logging::engine_debug;
use frontier_core::{
    update, AccumulatorSnapshot, Accumulators, Backoff, Effect, Feature, ImageEvent, Outcome,
    Task,
};

use crate::{BackoffSettings, CancelToken};

/// One partition's accumulators behind a single lock.
///
/// Workers and the dispatcher only see whole operations; no caller ever holds
/// a reference into the collections.
#[derive(Debug, Clone, Default)]
pub struct SharedAccumulator {
    inner: Arc<Mutex<Accumulators>>,
}

impl SharedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Accumulators> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn classify(&self, events: &[ImageEvent]) {
        self.lock().classify(events);
    }

    /// Applies a task outcome and returns the effects to carry out.
    pub fn apply(&self, outcome: Outcome) -> Vec<Effect> {
        update(&mut self.lock(), outcome)
    }

    /// Drains at most one batch per kind, in extract, save, delete order.
    pub fn drain_round(&self) -> Vec<Task> {
        let mut state = self.lock();
        let mut tasks = Vec::with_capacity(3);
        if let Some(ids) = state.drain_extract_batch() {
            tasks.push(Task::Extract { ids });
        }
        if let Some(features) = state.drain_save_batch() {
            tasks.push(Task::Save { features });
        }
        if let Some(ids) = state.drain_delete_batch() {
            tasks.push(Task::Delete { ids });
        }
        tasks
    }

    /// Returns the payload of a task that will not run back to the pending
    /// collections. Collect tasks carry no accumulated data.
    ///
    /// A save retry's features are already back in `pending_save` (the failed
    /// call requeued them), so only features not pending yet are restored.
    pub fn restore(&self, task: Task) {
        let mut state = self.lock();
        match task {
            Task::Collect { .. } => {}
            Task::Extract { ids } => state.requeue_extract(ids),
            Task::Save { features } => {
                let pending: HashSet<&str> =
                    state.pending_save().map(|feature| feature.id.as_str()).collect();
                let missing: Vec<Feature> = features
                    .into_iter()
                    .filter(|feature| !pending.contains(feature.id.as_str()))
                    .collect();
                state.requeue_save(missing);
            }
            Task::Delete { ids } => state.requeue_delete(ids),
        }
    }

    pub fn snapshot(&self) -> AccumulatorSnapshot {
        self.lock().snapshot()
    }
}

/// Process-wide backoff shared by every worker of every partition.
#[derive(Debug)]
pub struct SharedBackoff {
    state: Mutex<Backoff>,
    unit: Duration,
}

impl SharedBackoff {
    pub fn new(settings: BackoffSettings) -> Self {
        Self {
            state: Mutex::new(Backoff::new(settings.floor, settings.ceiling)),
            unit: settings.unit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Backoff> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> u32 {
        self.lock().current()
    }

    /// Request timeout tracks the current delay.
    pub fn request_timeout(&self) -> Duration {
        self.unit * self.current()
    }

    pub fn record_success(&self) {
        self.lock().on_success();
    }

    /// Sleeps out the current delay and grows it. The lock is released before
    /// sleeping. Returns `false` if cancelled during the sleep.
    pub fn record_failure(&self, cancel: &CancelToken) -> bool {
        let delay = self.lock().on_failure();
        let pause = self.unit * delay;
        engine_debug!("backing off for {:?}", pause);
        cancel.sleep(pause)
    }
}
