use std::collections::HashMap;
use std::sync::Arc;

use cascade_core::config::ModelConfig;
use cascade_core::error::{CascadeError, Result};
use cascade_core::traits::{CompletionClient, Node, SearchClient};
use cascade_core::types::NodeSpec;

use crate::builtin;

type Constructor = Box<dyn Fn(&NodeSpec) -> Result<Arc<dyn Node>> + Send + Sync>;

/// Registry of node constructors, keyed by kind name.
///
/// This is the single extension seam: adding a node kind means registering
/// one constructor — no other component changes.
pub struct NodeFactory {
    constructors: HashMap<String, Constructor>,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor for a kind name.
    pub fn register(
        &mut self,
        kind: &str,
        ctor: impl Fn(&NodeSpec) -> Result<Arc<dyn Node>> + Send + Sync + 'static,
    ) {
        self.constructors.insert(kind.to_string(), Box::new(ctor));
    }

    /// Build a live node from its declarative spec. Fails with
    /// `UnknownNodeKind` for unregistered tags; constructors fail with
    /// `InvalidNodeParameters` when coercion or a required field fails.
    pub fn create(&self, spec: &NodeSpec) -> Result<Arc<dyn Node>> {
        let ctor = self
            .constructors
            .get(&spec.kind)
            .ok_or_else(|| CascadeError::UnknownNodeKind(spec.kind.clone()))?;
        ctor(spec)
    }

    /// Registered kind names.
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(|s| s.as_str()).collect()
    }

    /// Create a factory with every built-in kind registered.
    ///
    /// The web_search kind is only registered when a search client is
    /// configured, so workflows naming it against an unconfigured process
    /// fail at load time with `UnknownNodeKind`.
    pub fn with_builtins(
        model: ModelConfig,
        completion: Arc<dyn CompletionClient>,
        search: Option<Arc<dyn SearchClient>>,
        search_max_results: usize,
    ) -> Self {
        let mut factory = Self::new();

        factory.register("uppercase", |spec| {
            Ok(Arc::new(builtin::transform::UppercaseNode::new(&spec.id)) as Arc<dyn Node>)
        });
        factory.register("trim", |spec| {
            Ok(Arc::new(builtin::transform::TrimNode::new(&spec.id)) as Arc<dyn Node>)
        });
        factory.register("reverse", |spec| {
            Ok(Arc::new(builtin::transform::ReverseNode::new(&spec.id)) as Arc<dyn Node>)
        });
        factory.register("replace", |spec| {
            let old = require_str(spec, "old")?;
            let new = require_str(spec, "new")?;
            Ok(Arc::new(builtin::transform::ReplaceNode::new(&spec.id, old, new)) as Arc<dyn Node>)
        });
        factory.register("file_read", |spec| {
            let path = require_str(spec, "file_path")?;
            Ok(Arc::new(builtin::file_read::FileReadNode::new(&spec.id, path)) as Arc<dyn Node>)
        });
        factory.register("memory", |spec| {
            let max_turns = require_usize(spec, "max_turns")?;
            if max_turns < 1 {
                return Err(invalid(spec, "'max_turns' must be >= 1"));
            }
            Ok(Arc::new(builtin::memory::MemoryNode::new(&spec.id, max_turns)) as Arc<dyn Node>)
        });
        factory.register("router", |spec| {
            Ok(Arc::new(builtin::router::RouterNode::new(&spec.id)) as Arc<dyn Node>)
        });

        let llm_model = model.clone();
        let llm_client = completion.clone();
        factory.register("llm", move |spec| {
            let model_id = optional_str(spec, "model")?
                .unwrap_or_else(|| llm_model.model_id.clone());
            let system_prompt = require_str(spec, "system_prompt")?;
            let temperature =
                optional_f64(spec, "temperature")?.unwrap_or(llm_model.temperature as f64) as f32;
            Ok(Arc::new(builtin::llm::LlmNode::new(
                &spec.id,
                model_id,
                system_prompt,
                temperature,
                llm_model.clone(),
                llm_client.clone(),
            )) as Arc<dyn Node>)
        });

        if let Some(search_client) = search {
            factory.register("web_search", move |spec| {
                let max_results =
                    optional_usize(spec, "max_results")?.unwrap_or(search_max_results);
                Ok(Arc::new(builtin::web_search::WebSearchNode::new(
                    &spec.id,
                    max_results,
                    search_client.clone(),
                )) as Arc<dyn Node>)
            });
        }

        factory
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(spec: &NodeSpec, message: &str) -> CascadeError {
    CascadeError::InvalidNodeParameters {
        node: spec.id.clone(),
        message: message.to_string(),
    }
}

fn require_str(spec: &NodeSpec, key: &str) -> Result<String> {
    match spec.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(spec, &format!("'{}' must be a string", key))),
        None => Err(invalid(spec, &format!("missing required parameter '{}'", key))),
    }
}

fn optional_str(spec: &NodeSpec, key: &str) -> Result<Option<String>> {
    match spec.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(spec, &format!("'{}' must be a string", key))),
        None => Ok(None),
    }
}

fn optional_f64(spec: &NodeSpec, key: &str) -> Result<Option<f64>> {
    match spec.params.get(key) {
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(spec, &format!("'{}' must be a number", key))),
        None => Ok(None),
    }
}

fn optional_usize(spec: &NodeSpec, key: &str) -> Result<Option<usize>> {
    match spec.params.get(key) {
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| invalid(spec, &format!("'{}' must be a non-negative integer", key))),
        None => Ok(None),
    }
}

fn require_usize(spec: &NodeSpec, key: &str) -> Result<usize> {
    optional_usize(spec, key)?
        .ok_or_else(|| invalid(spec, &format!("missing required parameter '{}'", key)))
}
