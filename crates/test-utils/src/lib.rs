use async_trait::async_trait;
use brandsight::providers::ai::AiProvider;
use brandsight::providers::db::{InsightStore, MemoryInsightStore};
use brandsight::providers::extraction::ExtractionProvider;
use brandsight::providers::search::SearchProvider;
use brandsight::{
    ContentResult, ExtractOptions, ExtractedContent, GenerateOptions, Insight, InsightError,
    InsightPipeline, InsightStatus, PipelineConfig, SearchOptions, SearchResult,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shorthand for building a `SearchResult`.
pub fn hit(url: &str, title: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
    }
}

pub fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// --- Mock Search Provider ---

/// Answers queries from a programmed table. Unknown queries return zero hits.
#[derive(Clone, Debug, Default)]
pub struct MockSearchProvider {
    responses: Arc<Mutex<HashMap<String, Result<Vec<SearchResult>, String>>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_results(&self, query: &str, results: Vec<SearchResult>) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(query.to_string(), Ok(results));
    }

    pub fn add_error(&self, query: &str, message: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(query.to_string(), Err(message.to_string()));
    }

    /// Delays the answer for `query`, so later queries can finish first.
    pub fn add_delay(&self, query: &str, delay: Duration) {
        let mut delays = self.delays.lock().unwrap();
        delays.insert(query.to_string(), delay);
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, InsightError> {
        self.calls.lock().unwrap().push(query.to_string());

        let delay = self.delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().unwrap().get(query).cloned();
        match response {
            Some(Ok(results)) => Ok(results.into_iter().take(options.num_results).collect()),
            Some(Err(message)) => Err(InsightError::provider("mock search", message)),
            None => Ok(Vec::new()),
        }
    }
}

// --- Mock Extraction Provider ---

/// Returns one result per URL; URLs marked as failing come back with `success = false`.
///
/// The context is the programmed one if set, otherwise the successful page
/// contents joined by blank lines.
#[derive(Clone, Debug, Default)]
pub struct MockExtractionProvider {
    context: Arc<Mutex<Option<String>>>,
    failing_urls: Arc<Mutex<HashSet<String>>>,
    error: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockExtractionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: &str) -> Self {
        let provider = Self::default();
        *provider.context.lock().unwrap() = Some(context.to_string());
        provider
    }

    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }

    /// Makes every call fail as a whole.
    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    pub fn get_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionProvider for MockExtractionProvider {
    async fn get_contents(
        &self,
        urls: &[String],
        _options: &ExtractOptions,
    ) -> Result<ExtractedContent, InsightError> {
        self.calls.lock().unwrap().push(urls.to_vec());

        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(InsightError::provider("mock extraction", message));
        }

        let failing = self.failing_urls.lock().unwrap().clone();
        let results: Vec<ContentResult> = urls
            .iter()
            .map(|url| {
                if failing.contains(url) {
                    ContentResult::failed(url, "fetch failed")
                } else {
                    ContentResult::extracted(
                        url,
                        format!("Title of {url}"),
                        format!("Content of {url}"),
                    )
                }
            })
            .collect();

        let context = self.context.lock().unwrap().clone().unwrap_or_else(|| {
            results
                .iter()
                .filter(|r| r.success)
                .map(|r| r.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        });

        Ok(ExtractedContent { context, results })
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    response: Arc<Mutex<Result<String, String>>>,
    calls: Arc<Mutex<Vec<(String, GenerateOptions)>>>,
}

impl MockAiProvider {
    pub fn new(response: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(response.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        let provider = Self::new("");
        *provider.response.lock().unwrap() = Err(message.to_string());
        provider
    }

    /// Retrieves the recorded prompts and options for assertion.
    pub fn get_calls(&self) -> Vec<(String, GenerateOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new("mock insights")
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, InsightError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));

        self.response
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| InsightError::provider("mock ai", message))
    }
}

// --- Recording Insight Store ---

/// Wraps a `MemoryInsightStore` and records the status of every `update`.
/// Updates to a status registered with `fail_updates_to` are rejected.
#[derive(Clone, Debug, Default)]
pub struct RecordingInsightStore {
    inner: MemoryInsightStore,
    updates: Arc<Mutex<Vec<InsightStatus>>>,
    failing: Arc<Mutex<Option<InsightStatus>>>,
}

impl RecordingInsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_updates_to(&self, status: InsightStatus) {
        *self.failing.lock().unwrap() = Some(status);
    }

    /// The statuses passed to `update`, in call order.
    pub fn updates(&self) -> Vec<InsightStatus> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl InsightStore for RecordingInsightStore {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn create(&self, insight: &Insight) -> Result<(), InsightError> {
        self.inner.create(insight).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Insight>, InsightError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Insight>, InsightError> {
        self.inner.find_by_user(user_id).await
    }

    async fn find_all(&self) -> Result<Vec<Insight>, InsightError> {
        self.inner.find_all().await
    }

    async fn update(&self, insight: &Insight) -> Result<(), InsightError> {
        self.updates.lock().unwrap().push(insight.status);
        if *self.failing.lock().unwrap() == Some(insight.status) {
            return Err(InsightError::Storage("disk full".to_string()));
        }
        self.inner.update(insight).await
    }

    async fn delete(&self, id: &str) -> Result<bool, InsightError> {
        self.inner.delete(id).await
    }
}

// --- Test Setup ---

/// A pipeline wired to the given mocks and a fresh in-memory store.
///
/// The returned store shares its state with the pipeline's, so tests can
/// inspect what was persisted.
pub fn memory_pipeline(
    search: &MockSearchProvider,
    extraction: &MockExtractionProvider,
    ai: &MockAiProvider,
    config: PipelineConfig,
) -> anyhow::Result<(InsightPipeline, MemoryInsightStore)> {
    let store = MemoryInsightStore::new();
    let pipeline = InsightPipeline::builder()
        .search_provider(Box::new(search.clone()))
        .extraction_provider(Box::new(extraction.clone()))
        .ai_provider(Box::new(ai.clone()))
        .store(Box::new(store.clone()))
        .config(config)
        .build()?;
    Ok((pipeline, store))
}

/// Like `memory_pipeline`, but backed by a `RecordingInsightStore`.
pub fn recording_pipeline(
    search: &MockSearchProvider,
    extraction: &MockExtractionProvider,
    ai: &MockAiProvider,
) -> anyhow::Result<(InsightPipeline, RecordingInsightStore)> {
    let store = RecordingInsightStore::new();
    let pipeline = InsightPipeline::builder()
        .search_provider(Box::new(search.clone()))
        .extraction_provider(Box::new(extraction.clone()))
        .ai_provider(Box::new(ai.clone()))
        .store(Box::new(store.clone()))
        .config(PipelineConfig::default())
        .build()?;
    Ok((pipeline, store))
}
