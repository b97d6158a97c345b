use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use engine_logging::{engine_error, engine_info, set_worker_tag};
use frontier_core::{CrawlError, DocumentRef, Task};
use tokio::runtime::Runtime;

use crate::worker::{FatalSlot, Worker};
use crate::{
    BatchDispatcher, CancelToken, EngineConfig, EngineError, FeatureStore, PartitionMode,
    PartitionReport, RunReport, SharedAccumulator, SharedBackoff, TaskQueue,
};

const SHARED_LABEL: &str = "all";

struct Partition {
    label: String,
    accumulator: SharedAccumulator,
    queue: TaskQueue,
}

impl Partition {
    fn report(&self) -> PartitionReport {
        PartitionReport {
            label: self.label.clone(),
            snapshot: self.accumulator.snapshot(),
            queued: self.queue.len(),
        }
    }
}

/// A running crawl: one dispatcher and a worker pool per partition, all
/// sharing one backoff, one io runtime and one cancellation token.
///
/// The run only ends on [`EngineHandle::stop`], cancellation of a parent
/// token, or a fatal `Unauthorized` response.
pub struct EngineHandle {
    cancel: CancelToken,
    partitions: Vec<Partition>,
    threads: Vec<JoinHandle<()>>,
    fatal: FatalSlot,
    runtime: Option<Runtime>,
}

impl EngineHandle {
    pub fn start(
        config: EngineConfig,
        store: Arc<dyn FeatureStore>,
        seeds: Vec<DocumentRef>,
        cancel: CancelToken,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if seeds.is_empty() {
            return Err(EngineError::NoSeeds);
        }
        let groups = partition_seeds(config.partition_mode, seeds);
        let limit = config.max_seeds_per_partition();
        if let Some((label, docs)) = groups.iter().find(|(_, docs)| docs.len() > limit) {
            return Err(EngineError::InvalidConfig(format!(
                "partition {label} has {} seeds but its queue only fits {limit}",
                docs.len()
            )));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("frontier-io")
            .build()
            .map_err(EngineError::Runtime)?;

        let mut handle = Self {
            cancel,
            partitions: Vec::with_capacity(groups.len()),
            threads: Vec::new(),
            fatal: Arc::new(Mutex::new(None)),
            runtime: None,
        };
        let backoff = Arc::new(SharedBackoff::new(config.backoff));

        for (label, docs) in groups {
            let spawned = handle.spawn_partition(
                &config,
                &runtime,
                label,
                docs,
                Arc::clone(&store),
                Arc::clone(&backoff),
            );
            if let Err(err) = spawned {
                handle.stop();
                handle.join_threads();
                return Err(err);
            }
        }
        handle.runtime = Some(runtime);
        Ok(handle)
    }

    fn spawn_partition(
        &mut self,
        config: &EngineConfig,
        runtime: &Runtime,
        label: String,
        seeds: Vec<DocumentRef>,
        store: Arc<dyn FeatureStore>,
        backoff: Arc<SharedBackoff>,
    ) -> Result<(), EngineError> {
        let accumulator = SharedAccumulator::new();
        let queue = TaskQueue::bounded(config.queue_capacity);
        let seed_count = seeds.len();
        for doc in seeds {
            // Fits: seed count was checked against the capacity.
            if let Err(task) = queue.offer(Task::Collect { doc }, 0) {
                return Err(EngineError::InvalidConfig(format!(
                    "seed {task:?} does not fit in the queue"
                )));
            }
        }

        let dispatcher = BatchDispatcher::new(
            accumulator.clone(),
            queue.clone(),
            config.workers,
            config.idle_poll,
            config.full_queue_pause,
        );
        let cancel = self.cancel.clone();
        let tag = format!("{label}/dispatcher");
        self.spawn(tag.clone(), move || {
            set_worker_tag(tag);
            dispatcher.run(&cancel);
        })?;

        for n in 1..=config.workers {
            let worker = Worker {
                queue: queue.clone(),
                accumulator: accumulator.clone(),
                store: Arc::clone(&store),
                backoff: Arc::clone(&backoff),
                runtime: runtime.handle().clone(),
                cancel: self.cancel.clone(),
                cooldown: config.cooldown,
                fatal: Arc::clone(&self.fatal),
            };
            let tag = format!("{label}/worker-{n}");
            self.spawn(tag.clone(), move || {
                set_worker_tag(tag);
                worker.run();
            })?;
        }

        engine_info!(
            "partition {label} started: {seed_count} seed(s), {} worker(s), queue capacity {}",
            config.workers,
            config.queue_capacity
        );
        self.partitions.push(Partition {
            label,
            accumulator,
            queue,
        });
        Ok(())
    }

    fn spawn<F>(&mut self, name: String, body: F) -> Result<(), EngineError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(body)
            .map_err(|source| EngineError::Spawn { name, source })?;
        self.threads.push(handle);
        Ok(())
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// True once every engine thread has exited.
    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(JoinHandle::is_finished)
    }

    pub fn snapshots(&self) -> RunReport {
        RunReport {
            partitions: self.partitions.iter().map(Partition::report).collect(),
        }
    }

    /// Waits for every thread to exit. Batches still sitting in the queues are
    /// folded back into their accumulators before the final report is taken.
    pub fn join(mut self) -> Result<RunReport, CrawlError> {
        self.join_threads();
        for partition in &self.partitions {
            for task in partition.queue.drain() {
                partition.accumulator.restore(task);
            }
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(Duration::from_secs(1));
        }

        let fatal = self
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match fatal {
            Some(err) => Err(err),
            None => Ok(self.snapshots()),
        }
    }

    fn join_threads(&mut self) {
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("engine").to_string();
            if handle.join().is_err() {
                engine_error!("thread {name} panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn partition_seeds(mode: PartitionMode, seeds: Vec<DocumentRef>) -> Vec<(String, Vec<DocumentRef>)> {
    match mode {
        PartitionMode::Shared => vec![(SHARED_LABEL.to_string(), seeds)],
        PartitionMode::PerCategory => {
            let mut groups: BTreeMap<String, Vec<DocumentRef>> = BTreeMap::new();
            for doc in seeds {
                groups.entry(doc.category().to_string()).or_default().push(doc);
            }
            groups.into_iter().collect()
        }
    }
}
