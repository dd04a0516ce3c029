use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// Top-level Cascade configuration, loaded from `cascade.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub web_search: Option<WebSearchConfig>,
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
    /// Directory where workflow JSON files live.
    #[serde(default = "default_workflow_dir")]
    pub workflow_dir: String,
    /// Workflow file used when a request names none.
    #[serde(default = "default_workflow")]
    pub default_workflow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name; everything OpenAI-compatible uses the same client.
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model_id: String,
    /// Literal API key. Prefer `api_key_env` so keys stay out of the file.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable to read the API key from.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Override the provider endpoint (Ollama, vLLM, OpenRouter, ...).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Dollars per million input tokens, used for the cost annotation.
    #[serde(default)]
    pub input_price_per_mtok: f64,
    /// Dollars per million output tokens.
    #[serde(default)]
    pub output_price_per_mtok: f64,
}

impl ModelConfig {
    /// Resolve the API key: literal value wins, then the named env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Dollar cost of a call given reported token usage.
    pub fn cost_of(&self, usage: &crate::types::Usage) -> f64 {
        (usage.input_tokens as f64 * self.input_price_per_mtok
            + usage.output_tokens as f64 * self.output_price_per_mtok)
            / 1_000_000.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl WebSearchConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_results() -> usize {
    5
}

fn default_bind() -> String {
    "127.0.0.1:8420".to_string()
}

fn default_workflow_dir() -> String {
    "workflows".to_string()
}

fn default_workflow() -> String {
    "workflow_example.json".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CascadeError::ConfigNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| CascadeError::Config(e.to_string()))
    }
}
