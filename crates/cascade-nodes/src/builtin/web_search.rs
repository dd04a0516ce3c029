use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use cascade_core::context::{keys, Context};
use cascade_core::error::Result;
use cascade_core::traits::{Node, SearchClient};

/// Fetches search results for the running value and appends the snippets
/// under `search_results` for later prompt injection. The input passes
/// through unchanged; a search failure aborts the run — there is no
/// degraded "continue without results" mode.
pub struct WebSearchNode {
    id: String,
    max_results: usize,
    client: Arc<dyn SearchClient>,
}

impl WebSearchNode {
    pub fn new(id: &str, max_results: usize, client: Arc<dyn SearchClient>) -> Self {
        Self {
            id: id.to_string(),
            max_results,
            client,
        }
    }
}

impl Node for WebSearchNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "web_search"
    }

    fn execute<'a>(&'a self, input: String, ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            // Fall back to the seeded user input when upstream handed us
            // an empty running value.
            let query = if input.trim().is_empty() {
                ctx.text(keys::USER_INPUT).unwrap_or_default().to_string()
            } else {
                input.clone()
            };

            info!(node = %self.id, query = %query, "Searching the web");
            let snippets = self.client.search(&query, self.max_results).await?;
            debug!(node = %self.id, count = snippets.len(), "Search complete");

            for snippet in snippets {
                ctx.append(keys::SEARCH_RESULTS, snippet);
            }
            Ok(input)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::error::CascadeError;

    struct StaticSearch(Vec<String>);

    impl SearchClient for StaticSearch {
        fn search<'a>(
            &'a self,
            _query: &'a str,
            max_results: usize,
        ) -> BoxFuture<'a, Result<Vec<String>>> {
            Box::pin(async move { Ok(self.0.iter().take(max_results).cloned().collect()) })
        }
    }

    struct FailingSearch;

    impl SearchClient for FailingSearch {
        fn search<'a>(
            &'a self,
            _query: &'a str,
            _max_results: usize,
        ) -> BoxFuture<'a, Result<Vec<String>>> {
            Box::pin(async {
                Err(CascadeError::ExternalService {
                    service: "web_search".into(),
                    message: "503".into(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_appends_snippets_and_passes_through() {
        let client = Arc::new(StaticSearch(vec!["one".into(), "two".into(), "three".into()]));
        let node = WebSearchNode::new("search", 2, client);
        let mut ctx = Context::new();

        let out = node.execute("rust workflows".into(), &mut ctx).await.unwrap();
        assert_eq!(out, "rust workflows");
        assert_eq!(
            ctx.list(keys::SEARCH_RESULTS),
            Some(&["one".to_string(), "two".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_failure_aborts() {
        let node = WebSearchNode::new("search", 5, Arc::new(FailingSearch));
        let mut ctx = Context::new();
        let err = node.execute("query".into(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, CascadeError::ExternalService { .. }));
        assert!(!ctx.contains(keys::SEARCH_RESULTS));
    }
}
