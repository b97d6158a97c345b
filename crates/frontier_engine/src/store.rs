use std::time::Duration;

use frontier_core::{CrawlError, DocumentRef, Feature};

use crate::DocumentPage;

/// Remote feature store as seen by the worker pool.
///
/// Every call maps status 200 to success, 401 to
/// [`CrawlError::Unauthorized`], and anything else to a retryable error.
/// `timeout` bounds the whole request and follows the shared backoff value.
#[async_trait::async_trait]
pub trait FeatureStore: Send + Sync {
    async fn fetch_document(
        &self,
        doc: &DocumentRef,
        timeout: Duration,
    ) -> Result<DocumentPage, CrawlError>;

    /// Returns features for the subset of `ids` the service could extract.
    async fn fetch_features(
        &self,
        ids: &[String],
        timeout: Duration,
    ) -> Result<Vec<Feature>, CrawlError>;

    async fn persist_features(
        &self,
        features: &[Feature],
        timeout: Duration,
    ) -> Result<(), CrawlError>;

    async fn delete_features(&self, ids: &[String], timeout: Duration) -> Result<(), CrawlError>;
}
