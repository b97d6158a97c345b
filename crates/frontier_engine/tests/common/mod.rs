#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use frontier_core::{CrawlError, DocumentRef, Feature, TaskKind};
use frontier_engine::{
    BackoffSettings, DocumentPage, EngineConfig, FeatureStore, ImageEntry, PartitionMode,
};

/// In-memory feature store. Unknown documents behave like a chain that has
/// not advanced yet.
#[derive(Default)]
pub struct FakeStore {
    documents: Mutex<HashMap<DocumentRef, DocumentPage>>,
    refused: Mutex<HashSet<String>>,
    pub saved: Mutex<Vec<Feature>>,
    pub deleted: Mutex<Vec<String>>,
    pub save_calls: AtomicUsize,
    pub document_calls: AtomicUsize,
    /// Timeout handed to every call, in call order.
    pub timeouts: Mutex<Vec<(TaskKind, Duration)>>,
    unauthorized: AtomicBool,
    failing_saves: AtomicUsize,
    failing_extracts: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: &str, next_url: &str, images: Vec<ImageEntry>) -> Self {
        let doc = DocumentRef::parse(path).unwrap();
        self.documents.lock().unwrap().insert(
            doc,
            DocumentPage {
                next_url: next_url.to_string(),
                images,
            },
        );
        self
    }

    pub fn refuse(self, id: &str) -> Self {
        self.refused.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn reject_next_saves(self, count: usize) -> Self {
        self.failing_saves.store(count, Ordering::SeqCst);
        self
    }

    pub fn fail_next_extracts(self, count: usize) -> Self {
        self.failing_extracts.store(count, Ordering::SeqCst);
        self
    }

    pub fn unauthorized(self) -> Self {
        self.unauthorized.store(true, Ordering::SeqCst);
        self
    }

    pub fn saved_len(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn deleted_len(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    pub fn timeouts_for(&self, kind: TaskKind) -> Vec<Duration> {
        self.timeouts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, timeout)| *timeout)
            .collect()
    }

    fn record(&self, kind: TaskKind, timeout: Duration) {
        self.timeouts.lock().unwrap().push((kind, timeout));
    }

    fn check_auth(&self) -> Result<(), CrawlError> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(CrawlError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FeatureStore for FakeStore {
    async fn fetch_document(
        &self,
        doc: &DocumentRef,
        timeout: Duration,
    ) -> Result<DocumentPage, CrawlError> {
        self.record(TaskKind::Collect, timeout);
        self.check_auth()?;
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        let page = self.documents.lock().unwrap().get(doc).cloned();
        Ok(page.unwrap_or_else(|| DocumentPage {
            next_url: doc.path(),
            images: Vec::new(),
        }))
    }

    async fn fetch_features(
        &self,
        ids: &[String],
        timeout: Duration,
    ) -> Result<Vec<Feature>, CrawlError> {
        self.record(TaskKind::Extract, timeout);
        self.check_auth()?;
        let failing = self
            .failing_extracts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CrawlError::Transient("connection reset".to_string()));
        }
        let refused = self.refused.lock().unwrap();
        Ok(ids
            .iter()
            .filter(|id| !refused.contains(*id))
            .map(|id| Feature::new(id.clone(), id.len() as i64))
            .collect())
    }

    async fn persist_features(
        &self,
        features: &[Feature],
        timeout: Duration,
    ) -> Result<(), CrawlError> {
        self.record(TaskKind::Save, timeout);
        self.check_auth()?;
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let rejected = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(CrawlError::Rejected { status: 503 });
        }
        self.saved.lock().unwrap().extend_from_slice(features);
        Ok(())
    }

    async fn delete_features(&self, ids: &[String], timeout: Duration) -> Result<(), CrawlError> {
        self.record(TaskKind::Delete, timeout);
        self.check_auth()?;
        self.deleted.lock().unwrap().extend_from_slice(ids);
        Ok(())
    }
}

pub fn image(id: &str, kind: &str) -> ImageEntry {
    ImageEntry {
        id: id.to_string(),
        kind: kind.to_string(),
    }
}

pub fn images(prefix: &str, kind: &str, count: usize) -> Vec<ImageEntry> {
    (0..count)
        .map(|i| image(&format!("{prefix}{i}"), kind))
        .collect()
}

/// Millisecond-scale timings so whole runs finish quickly.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        workers: 2,
        queue_capacity: 10,
        partition_mode: PartitionMode::Shared,
        backoff: BackoffSettings {
            floor: 1,
            ceiling: 3,
            unit: Duration::from_millis(1),
        },
        cooldown: Duration::from_millis(5),
        idle_poll: Duration::from_millis(1),
        full_queue_pause: Duration::from_millis(1),
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
