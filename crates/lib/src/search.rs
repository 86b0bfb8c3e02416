//! # Multi-Query Search Aggregation
//!
//! Fans a batch of prompts out to the search provider, then merges the
//! per-prompt hit lists into one list without duplicate URLs:
//! 1.  **Fan-out**: one provider call per prompt, issued concurrently.
//! 2.  **Join**: results are concatenated in prompt order, then in the provider's
//!     order within each prompt, regardless of which call finished first.
//! 3.  **Deduplication**: the first occurrence of each URL wins.

use crate::{
    errors::InsightError,
    providers::search::SearchProvider,
    types::{SearchFailurePolicy, SearchOptions, SearchResult},
};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

/// Removes later occurrences of any URL already seen. Order is otherwise kept.
pub fn dedupe_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| seen.insert(result.url.clone()))
        .collect()
}

/// Runs every prompt through `provider` and returns the deduplicated hits.
///
/// With `SearchFailurePolicy::FailFast` the first failed prompt (in prompt
/// order) fails the aggregation. With `SkipFailed` failed prompts are dropped,
/// unless all of them failed.
pub async fn search_all(
    provider: &dyn SearchProvider,
    prompts: &[String],
    options: &SearchOptions,
    policy: SearchFailurePolicy,
) -> Result<Vec<SearchResult>, InsightError> {
    let outcomes = join_all(
        prompts
            .iter()
            .map(|prompt| provider.search(prompt, options)),
    )
    .await;

    let mut all_results = Vec::new();
    let mut first_error = None;
    let mut failed = 0;

    for (prompt, outcome) in prompts.iter().zip(outcomes) {
        match outcome {
            Ok(results) => {
                info!(prompt = %prompt, hits = results.len(), "Search completed");
                all_results.extend(results);
            }
            Err(e) => {
                warn!(prompt = %prompt, error = %e, "Web search failed for prompt");
                if policy == SearchFailurePolicy::FailFast {
                    return Err(e);
                }
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    if failed > 0 && failed == prompts.len() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    let total = all_results.len();
    let unique = dedupe_by_url(all_results);
    info!(
        prompts = prompts.len(),
        failed,
        total,
        unique = unique.len(),
        "Multi-query search aggregated"
    );
    Ok(unique)
}
