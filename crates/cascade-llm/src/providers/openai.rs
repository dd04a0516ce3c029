use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cascade_core::error::{CascadeError, Result};
use cascade_core::traits::CompletionClient;
use cascade_core::types::{Completion, CompletionRequest, Usage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible chat-completion client.
pub struct OpenAiClient {
    http: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CascadeError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OaiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct OaiMessage {
    role: String,
    content: String,
}

// Response types
#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OaiUsage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OaiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn service_error(message: impl Into<String>) -> CascadeError {
    CascadeError::ExternalService {
        service: "llm".to_string(),
        message: message.into(),
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<Completion>> {
        Box::pin(async move {
            let url = self.base_url.as_deref().unwrap_or(OPENAI_API_URL);

            let body = ChatRequest {
                model: request.model.clone(),
                messages: vec![
                    OaiMessage {
                        role: "system".to_string(),
                        content: request.system_prompt,
                    },
                    OaiMessage {
                        role: "user".to_string(),
                        content: request.user_prompt,
                    },
                ],
                max_tokens: request.max_tokens,
                temperature: if request.temperature > 0.0 {
                    Some(request.temperature)
                } else {
                    None
                },
                stream: false,
            };

            let mut req = self.http.post(url).json(&body);
            if let Some(ref api_key) = self.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }

            debug!(model = %request.model, url, "Sending completion request");
            let response = req.send().await.map_err(|e| service_error(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(service_error(format!("HTTP {}: {}", status, body)));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| service_error(format!("malformed response: {}", e)))?;

            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| service_error("response contained no choices"))?;

            let usage = parsed
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                })
                .unwrap_or_default();

            Ok(Completion { text, usage })
        })
    }
}
