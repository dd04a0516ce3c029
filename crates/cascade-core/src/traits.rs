use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::Result;
use crate::types::{Completion, CompletionRequest};

/// A single pipeline step.
///
/// This is the load-bearing abstraction: every current or future step kind
/// conforms to this one execution contract, which is what makes the
/// factory/registry pattern possible. A node only sees the upstream text
/// and the shared context — never another node's identity.
pub trait Node: Send + Sync + 'static {
    /// Identifier from the node's spec, used for error attribution.
    fn id(&self) -> &str;

    /// Registered kind name (e.g. "uppercase", "llm").
    fn kind(&self) -> &str;

    /// Execute the step: transform the running value and/or mutate the
    /// context. The engine does not proceed until this resolves.
    fn execute<'a>(
        &'a self,
        input: String,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Result<String>>;

    /// Called by the engine after a successful run with the final output,
    /// so stateful nodes (Memory) can record the assistant side of the
    /// exchange. Default: no-op.
    fn record_reply(&self, _reply: &str) {}
}

impl std::fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Language-model completion API — `complete(prompt, params) -> text`.
pub trait CompletionClient: Send + Sync + 'static {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<Completion>>;
}

/// Web-search API — `search(query) -> [text]`.
pub trait SearchClient: Send + Sync + 'static {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<Vec<String>>>;
}
