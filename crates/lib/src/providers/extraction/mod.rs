pub mod exa;

use crate::{
    errors::InsightError,
    types::{ExtractOptions, ExtractedContent},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a content-extraction provider.
#[async_trait]
pub trait ExtractionProvider: Send + Sync + Debug + DynClone {
    /// Fetches and extracts every URL in one batched call.
    ///
    /// Implementations return exactly one `ContentResult` per requested URL, in
    /// request order. A page that could not be extracted is reported inline with
    /// `success = false`; only a failure of the whole call is an error.
    async fn get_contents(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, InsightError>;
}

dyn_clone::clone_trait_object!(ExtractionProvider);
