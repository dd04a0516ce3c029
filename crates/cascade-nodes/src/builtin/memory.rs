use std::sync::Mutex;

use futures::future::BoxFuture;
use tracing::debug;

use cascade_core::context::{keys, Context};
use cascade_core::error::Result;
use cascade_core::traits::Node;
use cascade_core::types::ConversationTurn;

/// Bounds the growth of conversational state.
///
/// Each execution appends the incoming text as a user turn, evicts the
/// oldest turns beyond `max_turns` (strict FIFO), writes the serialized
/// remainder under `conversation_history` for downstream prompt injection,
/// and returns its input unchanged. The assistant side of the exchange
/// arrives through `record_reply` — the engine feeds the final reply back
/// after a run in which an LLM node actually answered. History lives for
/// the lifetime of one engine instance (one session).
pub struct MemoryNode {
    id: String,
    max_turns: usize,
    history: Mutex<Vec<ConversationTurn>>,
}

impl MemoryNode {
    pub fn new(id: &str, max_turns: usize) -> Self {
        Self {
            id: id.to_string(),
            max_turns,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the retained history, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.lock().unwrap().clone()
    }

    fn push_and_truncate(&self, turn: ConversationTurn) -> String {
        let mut history = self.history.lock().unwrap();
        history.push(turn);
        let len = history.len();
        if len > self.max_turns {
            history.drain(..len - self.max_turns);
        }
        serialize_history(&history)
    }
}

fn serialize_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Node for MemoryNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "memory"
    }

    fn execute<'a>(&'a self, input: String, ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let serialized = self.push_and_truncate(ConversationTurn::user(input.clone()));
            debug!(node = %self.id, max_turns = self.max_turns, "Recorded user turn");
            ctx.set(keys::CONVERSATION_HISTORY, serialized);
            Ok(input)
        })
    }

    fn record_reply(&self, reply: &str) {
        self.push_and_truncate(ConversationTurn::assistant(reply));
        debug!(node = %self.id, "Recorded assistant turn");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::types::Role;

    #[tokio::test]
    async fn test_fifo_eviction_keeps_most_recent() {
        let node = MemoryNode::new("mem", 2);
        let mut ctx = Context::new();
        for text in ["a", "b", "c"] {
            node.execute(text.into(), &mut ctx).await.unwrap();
        }
        let history = node.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "b");
        assert_eq!(history[1].text, "c");
    }

    #[tokio::test]
    async fn test_returns_input_unchanged_and_serializes() {
        let node = MemoryNode::new("mem", 4);
        let mut ctx = Context::new();
        let out = node.execute("hi there".into(), &mut ctx).await.unwrap();
        assert_eq!(out, "hi there");
        assert_eq!(ctx.text(keys::CONVERSATION_HISTORY), Some("user: hi there"));
    }

    #[tokio::test]
    async fn test_record_reply_adds_assistant_turn_under_bound() {
        let node = MemoryNode::new("mem", 2);
        let mut ctx = Context::new();
        node.execute("question".into(), &mut ctx).await.unwrap();
        node.record_reply("answer");

        let history = node.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].text, "answer");

        // Next user turn evicts the oldest entry, keeping both sides bounded.
        node.execute("follow-up".into(), &mut ctx).await.unwrap();
        let history = node.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "answer");
        assert_eq!(history[1].text, "follow-up");
    }
}
