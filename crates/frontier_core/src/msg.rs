use crate::{CrawlError, DocumentRef, Feature, ImageEvent};

/// What a single document fetch revealed about the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierStep {
    pub next: DocumentRef,
    pub events: Vec<ImageEvent>,
}

impl FrontierStep {
    /// The chain has not moved: same document, nothing new in it.
    pub fn is_stalled(&self, current: &DocumentRef) -> bool {
        self.next == *current && self.events.is_empty()
    }
}

/// Result of executing one task, fed back into [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Collected {
        doc: DocumentRef,
        result: Result<FrontierStep, CrawlError>,
    },
    Extracted {
        ids: Vec<String>,
        result: Result<Vec<Feature>, CrawlError>,
    },
    Saved {
        features: Vec<Feature>,
        result: Result<(), CrawlError>,
    },
    Deleted {
        ids: Vec<String>,
        result: Result<(), CrawlError>,
    },
}
