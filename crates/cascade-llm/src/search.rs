use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::json;
use tracing::debug;

use cascade_core::error::{CascadeError, Result};
use cascade_core::traits::SearchClient;

const TAVILY_API_URL: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tavily web-search client. Returns one formatted snippet per result.
pub struct TavilyClient {
    api_key: String,
    http: reqwest::Client,
}

impl TavilyClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CascadeError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            api_key: api_key.to_string(),
            http,
        })
    }
}

fn service_error(message: impl Into<String>) -> CascadeError {
    CascadeError::ExternalService {
        service: "web_search".to_string(),
        message: message.into(),
    }
}

impl SearchClient for TavilyClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let response = self
                .http
                .post(TAVILY_API_URL)
                .json(&json!({
                    "api_key": self.api_key,
                    "query": query,
                    "max_results": max_results,
                }))
                .send()
                .await
                .map_err(|e| service_error(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(service_error(format!("HTTP {}: {}", status, body)));
            }

            let body: serde_json::Value = response
                .json()
                .await
                .map_err(|e| service_error(format!("malformed response: {}", e)))?;

            let snippets = body["results"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .map(|r| {
                            format!(
                                "{} - {} ({})",
                                r["title"].as_str().unwrap_or(""),
                                r["content"].as_str().unwrap_or(""),
                                r["url"].as_str().unwrap_or("")
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            debug!(query, count = snippets.len(), "Web search returned");
            Ok(snippets)
        })
    }
}
