use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_warn};
use frontier_core::{BackoffSignal, CrawlError, Effect, Outcome, Task, TaskKind};
use tokio::runtime::Handle;

use crate::walker::walk;
use crate::{CancelToken, FeatureStore, SharedAccumulator, SharedBackoff, TaskQueue};

/// First fatal error of a run; later ones are dropped.
pub(crate) type FatalSlot = Arc<Mutex<Option<CrawlError>>>;

/// One queue consumer. Runs on its own OS thread and drives remote calls on
/// the shared io runtime.
pub(crate) struct Worker {
    pub(crate) queue: TaskQueue,
    pub(crate) accumulator: SharedAccumulator,
    pub(crate) store: Arc<dyn FeatureStore>,
    pub(crate) backoff: Arc<SharedBackoff>,
    pub(crate) runtime: Handle,
    pub(crate) cancel: CancelToken,
    pub(crate) cooldown: Duration,
    pub(crate) fatal: FatalSlot,
}

impl Worker {
    pub(crate) fn run(&self) {
        while let Some(task) = self.queue.pop(&self.cancel) {
            let kind = task.kind();
            engine_debug!("handling {kind} ({} item(s))", task.len());
            let outcome = self.execute(task);
            let effects = self.accumulator.apply(outcome);
            if !self.perform(kind, effects) {
                break;
            }
        }
        engine_debug!("worker stopped");
    }

    fn execute(&self, task: Task) -> Outcome {
        let timeout = self.backoff.request_timeout();
        let store = self.store.as_ref();
        self.runtime.block_on(async move {
            match task {
                Task::Collect { doc } => {
                    let result = walk(store, &doc, timeout).await;
                    Outcome::Collected { doc, result }
                }
                Task::Extract { ids } => {
                    let result = store.fetch_features(&ids, timeout).await;
                    Outcome::Extracted { ids, result }
                }
                Task::Save { features } => {
                    let result = store.persist_features(&features, timeout).await;
                    Outcome::Saved { features, result }
                }
                Task::Delete { ids } => {
                    let result = store.delete_features(&ids, timeout).await;
                    Outcome::Deleted { ids, result }
                }
            }
        })
    }

    /// Returns `false` once the worker should stop.
    fn perform(&self, kind: TaskKind, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::Enqueue(task) => {
                    if let Err(task) = self.queue.push(task, &self.cancel) {
                        self.accumulator.restore(task);
                        return false;
                    }
                }
                Effect::CoolDown => {
                    engine_debug!("chain has not advanced, cooling down for {:?}", self.cooldown);
                    self.cancel.sleep(self.cooldown);
                }
                Effect::Backoff(BackoffSignal::Success) => self.backoff.record_success(),
                Effect::Backoff(BackoffSignal::Failure) => {
                    self.backoff.record_failure(&self.cancel);
                }
                Effect::Warn(err) => engine_warn!("{kind} failed: {err}"),
                Effect::Halt(err) => {
                    engine_error!("{kind} failed fatally: {err}; stopping the run");
                    let mut slot = self.fatal.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                    drop(slot);
                    self.cancel.cancel();
                    return false;
                }
            }
        }
        !self.cancel.is_cancelled()
    }
}
