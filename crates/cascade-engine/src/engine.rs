use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use cascade_core::context::{keys, Context};
use cascade_core::error::{CascadeError, Result};
use cascade_core::traits::Node;
use cascade_core::types::WorkflowSpec;
use cascade_nodes::NodeFactory;

/// The result of one workflow run: the final text plus the context
/// snapshot for inspection (counters, search results, history).
#[derive(Debug)]
pub struct RunOutcome {
    pub output: String,
    pub context: Context,
}

/// Orchestrates sequential node execution over a shared per-run context.
///
/// Execution order is exactly the declared chain order — no reordering,
/// no skipping. Routing never removes a node from the sequence; it only
/// changes what flows into the next one. The first node failure aborts
/// the run with the failing node's identity attached.
#[derive(Debug)]
pub struct WorkflowEngine {
    name: String,
    nodes: Vec<Arc<dyn Node>>,
}

impl WorkflowEngine {
    /// Build an engine from an already-ordered node list.
    pub fn new(name: impl Into<String>, nodes: Vec<Arc<dyn Node>>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(CascadeError::MalformedWorkflow(
                "workflow has no nodes".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            nodes,
        })
    }

    /// Build an engine from a persisted workflow: validate the chain,
    /// then construct every node through the factory. Any construction
    /// failure aborts loading — no partial pipeline is built.
    pub fn from_spec(spec: &WorkflowSpec, factory: &NodeFactory) -> Result<Self> {
        let order = crate::graph::chain_order(spec)?;
        let by_id: HashMap<&str, _> = spec.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            // chain_order only returns ids present in the spec
            let node_spec = by_id[id.as_str()];
            nodes.push(factory.create(node_spec)?);
        }
        Self::new(spec.flow_name.clone(), nodes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Run the pipeline: seed a fresh context, thread the running value
    /// through every node in order, and feed the assistant reply back to
    /// stateful nodes once an LLM node has actually answered.
    pub async fn run(&self, initial_input: &str) -> Result<RunOutcome> {
        let mut ctx = Context::new();
        ctx.set(keys::USER_INPUT, initial_input);

        let mut current = initial_input.to_string();
        for node in &self.nodes {
            info!(workflow = %self.name, node = %node.id(), kind = %node.kind(), "Executing node");
            current = node.execute(current, &mut ctx).await.map_err(|e| {
                error!(workflow = %self.name, node = %node.id(), error = %e, "Node failed, aborting run");
                e.in_node(node.id(), node.kind())
            })?;
        }

        if let Some(reply) = ctx.text(keys::ASSISTANT_REPLY).map(str::to_string) {
            for node in &self.nodes {
                node.record_reply(&reply);
            }
        }

        Ok(RunOutcome {
            output: current,
            context: ctx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_nodes::builtin::memory::MemoryNode;
    use cascade_nodes::builtin::router::RouterNode;
    use cascade_nodes::builtin::transform::{TrimNode, UppercaseNode};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts executions; optionally fails every time.
    struct CountingNode {
        id: String,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingNode {
        fn new(id: &str, calls: Arc<AtomicUsize>, fail: bool) -> Self {
            Self {
                id: id.to_string(),
                calls,
                fail,
            }
        }
    }

    impl Node for CountingNode {
        fn id(&self) -> &str {
            &self.id
        }

        fn kind(&self) -> &str {
            "counting"
        }

        fn execute<'a>(
            &'a self,
            input: String,
            _ctx: &'a mut Context,
        ) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    return Err(CascadeError::ExternalService {
                        service: "test".into(),
                        message: "boom".into(),
                    });
                }
                Ok(input)
            })
        }
    }

    #[tokio::test]
    async fn test_sequential_order_and_final_output() {
        let engine = WorkflowEngine::new(
            "pipeline",
            vec![
                Arc::new(UppercaseNode::new("up")) as Arc<dyn Node>,
                Arc::new(TrimNode::new("trim")) as Arc<dyn Node>,
            ],
        )
        .unwrap();

        let outcome = engine.run("  hi there  ").await.unwrap();
        assert_eq!(outcome.output, "HI THERE");
        assert_eq!(outcome.context.text(keys::USER_INPUT), Some("  hi there  "));
    }

    #[tokio::test]
    async fn test_failure_stops_downstream_nodes() {
        let before = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));

        let engine = WorkflowEngine::new(
            "fails",
            vec![
                Arc::new(CountingNode::new("n1", before.clone(), false)) as Arc<dyn Node>,
                Arc::new(CountingNode::new("n2", failing.clone(), true)) as Arc<dyn Node>,
                Arc::new(CountingNode::new("n3", after.clone(), false)) as Arc<dyn Node>,
            ],
        )
        .unwrap();

        let err = engine.run("x").await.unwrap_err();
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(failing.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);

        match err {
            CascadeError::NodeFailed { id, kind, .. } => {
                assert_eq!(id, "n2");
                assert_eq!(kind, "counting");
            }
            other => panic!("expected NodeFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_router_replaces_running_value() {
        // A router match substitutes the canned response for everything
        // downstream — subsequent nodes still run, on the new value.
        let engine = WorkflowEngine::new(
            "routed",
            vec![
                Arc::new(RouterNode::new("router")) as Arc<dyn Node>,
                Arc::new(UppercaseNode::new("up")) as Arc<dyn Node>,
            ],
        )
        .unwrap();

        let outcome = engine.run("hello").await.unwrap();
        assert!(outcome.context.flag(keys::SKIP_LLM));
        assert_eq!(
            outcome.output,
            "HELLO! I'M THE CASCADE ASSISTANT. HOW CAN I HELP YOU TODAY?"
        );
    }

    #[tokio::test]
    async fn test_memory_across_runs_without_llm_reply() {
        // No LLM answered, so nothing is fed back as an assistant turn:
        // after three runs only the two most recent user turns remain.
        let memory = Arc::new(MemoryNode::new("mem", 2));
        let engine = WorkflowEngine::new(
            "remembered",
            vec![
                memory.clone() as Arc<dyn Node>,
                Arc::new(TrimNode::new("echo")) as Arc<dyn Node>,
            ],
        )
        .unwrap();

        for text in ["a", "b", "c"] {
            engine.run(text).await.unwrap();
        }

        let history = memory.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "b");
        assert_eq!(history[1].text, "c");
    }

    #[tokio::test]
    async fn test_empty_workflow_rejected() {
        assert!(matches!(
            WorkflowEngine::new("empty", vec![]).unwrap_err(),
            CascadeError::MalformedWorkflow(_)
        ));
    }
}
