//! Frontier core: pure crawl state, backoff policy and the post-call transition.
mod backoff;
mod doc_ref;
mod effect;
mod error;
mod msg;
mod state;
mod task;
mod update;

pub use backoff::{Backoff, DEFAULT_CEILING, DEFAULT_FLOOR};
pub use doc_ref::{parse_seed_list, DocumentRef};
pub use effect::{BackoffSignal, Effect};
pub use error::{CrawlError, SeedError};
pub use msg::{FrontierStep, Outcome};
pub use state::{AccumulatorSnapshot, Accumulators, BATCH_SIZE};
pub use task::{Feature, ImageEvent, ImageEventKind, Task, TaskKind};
pub use update::update;
