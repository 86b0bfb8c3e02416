use crate::{
    constants::EXA_API_URL,
    errors::InsightError,
    providers::{
        build_http_client, decode_error, search::SearchProvider, status_error, transport_error,
    },
    types::{SearchOptions, SearchResult},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const PROVIDER: &str = "exa search";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: usize,
}

#[derive(Deserialize, Debug)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaSearchHit>,
}

#[derive(Deserialize, Debug)]
struct ExaSearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// A search provider backed by the Exa `/search` endpoint.
#[derive(Clone, Debug)]
pub struct ExaSearchProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl ExaSearchProvider {
    pub fn new(
        api_url: Option<String>,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, InsightError> {
        if api_key.trim().is_empty() {
            return Err(InsightError::MissingApiKey(PROVIDER.to_string()));
        }
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| EXA_API_URL.to_string());
        Ok(Self {
            client: build_http_client(timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl SearchProvider for ExaSearchProvider {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, InsightError> {
        debug!(query = %query, num_results = options.num_results, "--> Sending query to Exa");

        let response = self
            .client
            .post(format!("{}/search", self.api_url))
            .header("x-api-key", &self.api_key)
            .json(&ExaSearchRequest {
                query,
                num_results: options.num_results,
            })
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let payload: ExaSearchResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e))?;

        let results = payload
            .results
            .into_iter()
            .filter_map(|hit| {
                let url = hit.url.unwrap_or_default().trim().to_string();
                if Url::parse(&url).is_err() {
                    warn!(query = %query, url = %url, "Dropping search hit without a valid URL");
                    return None;
                }
                Some(SearchResult {
                    title: hit.title.unwrap_or_default(),
                    url,
                })
            })
            .take(options.num_results)
            .collect();

        Ok(results)
    }
}
