use std::collections::{HashSet, VecDeque};

use crate::{Feature, ImageEvent, ImageEventKind};

/// Number of items carried by one extract/save/delete call.
///
/// A collection is only drained once it holds strictly more than this.
pub const BATCH_SIZE: usize = 50;

/// Deduplicated work collections of one partition.
///
/// Invariant: `pending_extract` and `total_extracted` are disjoint.
#[derive(Debug, Clone, Default)]
pub struct Accumulators {
    pending_extract: HashSet<String>,
    pending_delete: HashSet<String>,
    pending_save: VecDeque<Feature>,
    total_extracted: HashSet<String>,
    saved: u64,
    deleted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccumulatorSnapshot {
    pub pending_extract: usize,
    pub pending_delete: usize,
    pub pending_save: usize,
    pub total_extracted: usize,
    pub saved: u64,
    pub deleted: u64,
}

impl Accumulators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts collected image events into the pending sets.
    ///
    /// Adds already extracted are dropped. Deletes are always kept.
    pub fn classify(&mut self, events: &[ImageEvent]) {
        for event in events {
            match event.kind {
                ImageEventKind::Add => {
                    if !self.total_extracted.contains(&event.id) {
                        self.pending_extract.insert(event.id.clone());
                    }
                }
                ImageEventKind::Delete => {
                    self.pending_delete.insert(event.id.clone());
                }
            }
        }
    }

    pub fn drain_extract_batch(&mut self) -> Option<Vec<String>> {
        drain_set(&mut self.pending_extract)
    }

    pub fn drain_delete_batch(&mut self) -> Option<Vec<String>> {
        drain_set(&mut self.pending_delete)
    }

    /// Removes the oldest `BATCH_SIZE` features.
    pub fn drain_save_batch(&mut self) -> Option<Vec<Feature>> {
        if self.pending_save.len() <= BATCH_SIZE {
            return None;
        }
        Some(self.pending_save.drain(..BATCH_SIZE).collect())
    }

    pub fn mark_extracted<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.pending_extract.remove(id);
            self.total_extracted.insert(id.to_string());
        }
    }

    /// Queues features for persistence behind everything already pending.
    pub fn push_features(&mut self, features: impl IntoIterator<Item = Feature>) {
        self.pending_save.extend(features);
    }

    /// Returns ids to the extract pool; ids extracted meanwhile stay excluded.
    pub fn requeue_extract(&mut self, ids: impl IntoIterator<Item = String>) {
        for id in ids {
            if !self.total_extracted.contains(&id) {
                self.pending_extract.insert(id);
            }
        }
    }

    /// Puts features back at the front, keeping their relative order.
    pub fn requeue_save(&mut self, features: Vec<Feature>) {
        for feature in features.into_iter().rev() {
            self.pending_save.push_front(feature);
        }
    }

    pub fn requeue_delete(&mut self, ids: impl IntoIterator<Item = String>) {
        self.pending_delete.extend(ids);
    }

    pub fn record_saved(&mut self, count: usize) {
        self.saved += count as u64;
    }

    pub fn record_deleted(&mut self, count: usize) {
        self.deleted += count as u64;
    }

    pub fn is_extracted(&self, id: &str) -> bool {
        self.total_extracted.contains(id)
    }

    pub fn is_pending_extract(&self, id: &str) -> bool {
        self.pending_extract.contains(id)
    }

    pub fn is_pending_delete(&self, id: &str) -> bool {
        self.pending_delete.contains(id)
    }

    pub fn pending_save(&self) -> impl Iterator<Item = &Feature> {
        self.pending_save.iter()
    }

    pub fn snapshot(&self) -> AccumulatorSnapshot {
        AccumulatorSnapshot {
            pending_extract: self.pending_extract.len(),
            pending_delete: self.pending_delete.len(),
            pending_save: self.pending_save.len(),
            total_extracted: self.total_extracted.len(),
            saved: self.saved,
            deleted: self.deleted,
        }
    }
}

fn drain_set(set: &mut HashSet<String>) -> Option<Vec<String>> {
    if set.len() <= BATCH_SIZE {
        return None;
    }
    let batch: Vec<String> = set.iter().take(BATCH_SIZE).cloned().collect();
    for id in &batch {
        set.remove(id);
    }
    Some(batch)
}
