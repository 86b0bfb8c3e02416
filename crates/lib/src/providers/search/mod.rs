pub mod exa;

use crate::{
    errors::InsightError,
    types::{SearchOptions, SearchResult},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a web-search provider.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug + DynClone {
    /// Runs one free-text query and returns at most `options.num_results` hits in
    /// the provider's order.
    ///
    /// Zero hits is `Ok(vec![])`; only a failed call is an error.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, InsightError>;
}

dyn_clone::clone_trait_object!(SearchProvider);
