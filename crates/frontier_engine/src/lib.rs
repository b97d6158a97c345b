//! Frontier engine: remote store client, task queue, dispatcher and worker pool.
mod bootstrap;
mod cancel;
mod dispatcher;
mod engine;
mod http;
mod persist;
mod queue;
mod shared;
mod store;
mod token;
mod types;
mod walker;
mod wire;
mod worker;

pub use bootstrap::{Bootstrap, BootstrapError, Bootstrapper};
pub use cancel::CancelToken;
pub use dispatcher::BatchDispatcher;
pub use engine::EngineHandle;
pub use http::{ClientBuildError, ReqwestStore, StoreSettings, AUTH_HEADER};
pub use persist::{ensure_cache_dir, PersistError, TokenCache};
pub use queue::TaskQueue;
pub use shared::{SharedAccumulator, SharedBackoff};
pub use store::FeatureStore;
pub use token::AuthToken;
pub use types::{
    BackoffSettings, EngineConfig, EngineError, PartitionMode, PartitionReport, RunReport,
};
pub use walker::walk;
pub use wire::{DocumentPage, ImageEntry};
