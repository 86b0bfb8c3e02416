//! # Content Extraction
//!
//! Hands the deduplicated URL list to the extraction provider in a single
//! batched call. Page-level failures stay inline in the returned
//! `ContentResult`s; only a failure of the whole call is an error.

use crate::{
    errors::InsightError,
    providers::extraction::ExtractionProvider,
    types::{ExtractOptions, ExtractedContent},
};
use tracing::{info, warn};

/// Extracts readable content for `urls`.
///
/// An empty URL list short-circuits to an empty context without calling the
/// provider.
pub async fn extract(
    provider: &dyn ExtractionProvider,
    urls: &[String],
    options: &ExtractOptions,
) -> Result<ExtractedContent, InsightError> {
    if urls.is_empty() {
        info!("No URLs to extract; continuing with an empty context");
        return Ok(ExtractedContent::default());
    }

    let extracted = provider.get_contents(urls, options).await?;

    for failure in extracted.results.iter().filter(|r| !r.success) {
        warn!(
            url = %failure.url,
            error = failure.error.as_deref().unwrap_or("unknown"),
            "Page extraction failed"
        );
    }
    let succeeded = extracted.results.iter().filter(|r| r.success).count();
    info!(
        requested = urls.len(),
        succeeded,
        failed = extracted.results.len() - succeeded,
        context_chars = extracted.context.chars().count(),
        "Content extraction completed"
    );

    Ok(extracted)
}
