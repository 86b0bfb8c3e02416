use crate::{
    constants::EXA_API_URL,
    errors::InsightError,
    providers::{
        build_http_client, decode_error, extraction::ExtractionProvider, status_error,
        transport_error,
    },
    types::{ContentResult, ExtractOptions, ExtractedContent},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};
use tracing::debug;

const PROVIDER: &str = "exa contents";

#[derive(Serialize)]
struct ExaContentsRequest<'a> {
    urls: &'a [String],
    text: TextOptions,
    context: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Deserialize, Debug)]
struct ExaContentsResponse {
    #[serde(default)]
    results: Vec<ExaPage>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    statuses: Vec<ExaStatus>,
}

#[derive(Deserialize, Debug)]
struct ExaPage {
    #[serde(default)]
    id: Option<String>,
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ExaStatus {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<ExaStatusError>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ExaStatusError {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    http_status_code: Option<u16>,
}

impl ExaStatus {
    fn describe(&self) -> String {
        match &self.error {
            Some(ExaStatusError {
                tag: Some(tag),
                http_status_code: Some(code),
            }) => format!("{tag} (status {code})"),
            Some(ExaStatusError { tag: Some(tag), .. }) => tag.clone(),
            Some(ExaStatusError {
                http_status_code: Some(code),
                ..
            }) => format!("status {code}"),
            _ => format!("extraction {}", self.status),
        }
    }
}

/// An extraction provider backed by the Exa `/contents` endpoint.
#[derive(Clone, Debug)]
pub struct ExaContentsProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl ExaContentsProvider {
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

/// Lines the provider's pages and statuses up with the requested URLs.
fn collect_results(urls: &[String], response: ExaContentsResponse) -> Vec<ContentResult> {
    let mut pages: HashMap<String, ExaPage> = HashMap::new();
    for page in response.results {
        let key = page.id.clone().unwrap_or_else(|| page.url.clone());
        pages.insert(key, page);
    }
    let statuses: HashMap<&str, &ExaStatus> = response
        .statuses
        .iter()
        .map(|s| (s.id.as_str(), s))
        .collect();

    urls.iter()
        .map(|url| {
            if let Some(page) = pages.remove(url) {
                return ContentResult::extracted(
                    url,
                    page.title.unwrap_or_default(),
                    page.text.unwrap_or_default(),
                );
            }
            match statuses.get(url.as_str()) {
                Some(status) => ContentResult::failed(url, status.describe()),
                None => ContentResult::failed(url, "no content returned"),
            }
        })
        .collect()
}

#[async_trait]
impl ExtractionProvider for ExaContentsProvider {
    async fn get_contents(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, InsightError> {
        debug!(urls = urls.len(), max_characters = options.max_characters, "--> Requesting contents from Exa");

        let response = self
            .client
            .post(format!("{}/contents", self.api_url))
            .header("x-api-key", &self.api_key)
            .json(&ExaContentsRequest {
                urls,
                text: TextOptions {
                    max_characters: options.max_characters,
                },
                context: true,
            })
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let mut payload: ExaContentsResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e))?;

        let context = payload.context.take().unwrap_or_default();
        Ok(ExtractedContent {
            context,
            results: collect_results(urls, payload),
        })
    }
}
