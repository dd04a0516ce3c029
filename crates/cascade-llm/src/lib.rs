pub mod providers;
pub mod search;

use std::sync::Arc;

use cascade_core::config::{ModelConfig, WebSearchConfig};
use cascade_core::error::Result;
use cascade_core::traits::{CompletionClient, SearchClient};

pub use providers::openai::OpenAiClient;
pub use search::TavilyClient;

/// Create a completion client for the configured provider. Everything
/// speaks the OpenAI-compatible wire format (OpenAI, Ollama, vLLM, Groq,
/// OpenRouter, ...), differing only in base URL and key.
pub fn create_completion_client(config: &ModelConfig) -> Result<Arc<dyn CompletionClient>> {
    let client = OpenAiClient::new(config.base_url.clone(), config.resolve_api_key())?;
    Ok(Arc::new(client))
}

/// Create a search client when web search is configured with a key.
pub fn create_search_client(config: &WebSearchConfig) -> Result<Option<Arc<dyn SearchClient>>> {
    match config.resolve_api_key() {
        Some(key) => Ok(Some(Arc::new(TavilyClient::new(&key)?) as Arc<dyn SearchClient>)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_client_absent_without_key() {
        let cfg = WebSearchConfig {
            api_key: None,
            api_key_env: None,
            max_results: 5,
        };
        assert!(create_search_client(&cfg).unwrap().is_none());
    }

    #[test]
    fn test_search_client_present_with_key() {
        let cfg = WebSearchConfig {
            api_key: Some("k".into()),
            api_key_env: None,
            max_results: 5,
        };
        assert!(create_search_client(&cfg).unwrap().is_some());
    }
}
