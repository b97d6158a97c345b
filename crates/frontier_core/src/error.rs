use thiserror::Error;

/// Failure of a single remote call, as seen by the worker pool.
///
/// Only [`CrawlError::Unauthorized`] ends a run; every other variant is
/// absorbed by re-queuing the affected work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("credential rejected (401)")]
    Unauthorized,
    #[error("document collection failed with status {status}")]
    CollectionFailed { status: u16 },
    #[error("batch rejected with status {status}")]
    Rejected { status: u16 },
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("{missing} of {batch} ids were not acknowledged")]
    PartialBatchFailure { missing: usize, batch: usize },
}

impl CrawlError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("malformed document reference {0:?}: expected .../{{category}}/{{id}}")]
    Malformed(String),
}
