use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known context keys. Keys are process-defined constants, never user
/// input; all nodes share one flat space, so collisions are part of the
/// contract.
pub mod keys {
    /// The initial input of the run, seeded by the engine.
    pub const USER_INPUT: &str = "user_input";
    /// Serialized conversation history written by a Memory node.
    pub const CONVERSATION_HISTORY: &str = "conversation_history";
    /// Content loaded by a FileRead node.
    pub const FILE_CONTENT: &str = "file_content";
    /// Snippets appended by a WebSearch node.
    pub const SEARCH_RESULTS: &str = "search_results";
    /// Flag set by a Router node telling a downstream LLM node to pass
    /// its input through without an external call.
    pub const SKIP_LLM: &str = "skip_llm";
    /// The reply produced by an LLM node's external call, if any. The
    /// engine uses its presence to decide whether to feed the final
    /// output back into Memory as an assistant turn.
    pub const ASSISTANT_REPLY: &str = "assistant_reply";
    /// Accumulated cost of external LLM calls, in dollars.
    pub const TOTAL_COST: &str = "total_cost";
    /// Accumulated token count of external LLM calls.
    pub const TOTAL_TOKENS: &str = "total_tokens";
}

/// A value held in the run context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Bool(bool),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ContextValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ContextValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<f64> for ContextValue {
    fn from(n: f64) -> Self {
        ContextValue::Number(n)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

/// The shared, run-scoped key-value state all nodes read and write.
///
/// Created empty at the start of a run, mutated in place by every node in
/// sequence, discarded at run end. One run owns one context — concurrent
/// runs each get a fresh instance, so no locking is needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    values: HashMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<ContextValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Append to a list-valued key. An absent key becomes a one-element
    /// list; an existing scalar is wrapped into a list first so no write
    /// is silently dropped.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let mut items = match self.values.remove(key) {
            Some(ContextValue::List(items)) => items,
            Some(ContextValue::Text(s)) => vec![s],
            Some(ContextValue::Number(n)) => vec![n.to_string()],
            Some(ContextValue::Bool(b)) => vec![b.to_string()],
            None => Vec::new(),
        };
        items.push(value);
        self.values
            .insert(key.to_string(), ContextValue::List(items));
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_text)
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(ContextValue::as_list)
    }

    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(ContextValue::as_number).unwrap_or(0.0)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(ContextValue::as_bool).unwrap_or(false)
    }

    /// Add to the accumulated dollar cost counter.
    pub fn add_cost(&mut self, dollars: f64) {
        let total = self.number(keys::TOTAL_COST) + dollars;
        self.set(keys::TOTAL_COST, total);
    }

    /// Add to the accumulated token counter.
    pub fn add_tokens(&mut self, tokens: u64) {
        let total = self.number(keys::TOTAL_TOKENS) + tokens as f64;
        self.set(keys::TOTAL_TOKENS, total);
    }

    pub fn total_cost(&self) -> f64 {
        self.number(keys::TOTAL_COST)
    }

    pub fn total_tokens(&self) -> u64 {
        self.number(keys::TOTAL_TOKENS) as u64
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}
