use std::time::Duration;

use frontier_core::{CrawlError, DocumentRef, FrontierStep, ImageEvent, ImageEventKind};

use crate::FeatureStore;

/// Fetches one document and reports the next link plus its image events.
///
/// Events of an unknown kind, or without an id, are skipped. A `next_url`
/// that does not name a document counts as a malformed (transient) response.
pub async fn walk(
    store: &dyn FeatureStore,
    doc: &DocumentRef,
    timeout: Duration,
) -> Result<FrontierStep, CrawlError> {
    let page = store.fetch_document(doc, timeout).await?;
    let next = DocumentRef::parse(&page.next_url)
        .map_err(|err| CrawlError::Transient(format!("bad next_url from {doc}: {err}")))?;

    let events = page
        .images
        .into_iter()
        .filter(|image| !image.id.is_empty())
        .filter_map(|image| {
            ImageEventKind::from_wire(&image.kind).map(|kind| ImageEvent { id: image.id, kind })
        })
        .collect();

    Ok(FrontierStep { next, events })
}
