use std::fmt;
use std::time::Duration;

use frontier_core::{AccumulatorSnapshot, DEFAULT_CEILING, DEFAULT_FLOOR};
use serde::Deserialize;
use thiserror::Error;

/// How seeds are split into independent accumulator/queue partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PartitionMode {
    /// One partition for every seed.
    #[default]
    Shared,
    /// One partition per document category.
    PerCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSettings {
    pub floor: u32,
    pub ceiling: u32,
    /// Wall-clock length of one backoff step.
    pub unit: Duration,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            ceiling: DEFAULT_CEILING,
            unit: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Workers per partition.
    pub workers: usize,
    pub queue_capacity: usize,
    pub partition_mode: PartitionMode,
    pub backoff: BackoffSettings,
    /// Pause before revisiting a chain whose document has not been created yet.
    pub cooldown: Duration,
    /// Dispatcher pause when nothing is ready to drain.
    pub idle_poll: Duration,
    /// Dispatcher pause when the queue has no headroom.
    pub full_queue_pause: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 50,
            partition_mode: PartitionMode::Shared,
            backoff: BackoffSettings::default(),
            cooldown: Duration::from_secs(7),
            idle_poll: Duration::from_millis(50),
            full_queue_pause: Duration::from_secs(1),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        if self.queue_capacity <= self.workers {
            return Err(EngineError::InvalidConfig(format!(
                "queue capacity {} must exceed the worker count {}",
                self.queue_capacity, self.workers
            )));
        }
        Ok(())
    }

    /// Collect chains a single partition can carry without starving its workers.
    pub fn max_seeds_per_partition(&self) -> usize {
        self.queue_capacity.saturating_sub(self.workers)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("no seed documents to crawl")]
    NoSeeds,
    #[error("failed to start the io runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionReport {
    pub label: String,
    pub snapshot: AccumulatorSnapshot,
    pub queued: usize,
}

impl fmt::Display for PartitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        write!(
            f,
            "{}: queued={} extract={} save={} delete={} extracted={} saved={} deleted={}",
            self.label,
            self.queued,
            s.pending_extract,
            s.pending_save,
            s.pending_delete,
            s.total_extracted,
            s.saved,
            s.deleted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub partitions: Vec<PartitionReport>,
}

impl RunReport {
    pub fn partition(&self, label: &str) -> Option<&PartitionReport> {
        self.partitions.iter().find(|p| p.label == label)
    }
}
