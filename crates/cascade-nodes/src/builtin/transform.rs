use futures::future::BoxFuture;
use tracing::debug;

use cascade_core::context::Context;
use cascade_core::error::Result;
use cascade_core::traits::Node;

/// Converts the running value to uppercase.
pub struct UppercaseNode {
    id: String,
}

impl UppercaseNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Node for UppercaseNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "uppercase"
    }

    fn execute<'a>(&'a self, input: String, _ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        debug!(node = %self.id, "Converting to uppercase");
        Box::pin(async move { Ok(input.to_uppercase()) })
    }
}

/// Strips leading and trailing whitespace.
pub struct TrimNode {
    id: String,
}

impl TrimNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Node for TrimNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "trim"
    }

    fn execute<'a>(&'a self, input: String, _ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        debug!(node = %self.id, "Trimming whitespace");
        Box::pin(async move { Ok(input.trim().to_string()) })
    }
}

/// Reverses the running value, character by character.
pub struct ReverseNode {
    id: String,
}

impl ReverseNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Node for ReverseNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "reverse"
    }

    fn execute<'a>(&'a self, input: String, _ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        debug!(node = %self.id, "Reversing");
        Box::pin(async move { Ok(input.chars().rev().collect()) })
    }
}

/// Replaces every occurrence of `old` with `new`.
pub struct ReplaceNode {
    id: String,
    old: String,
    new: String,
}

impl ReplaceNode {
    pub fn new(id: &str, old: String, new: String) -> Self {
        Self {
            id: id.to_string(),
            old,
            new,
        }
    }
}

impl Node for ReplaceNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "replace"
    }

    fn execute<'a>(&'a self, input: String, _ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        debug!(node = %self.id, old = %self.old, new = %self.new, "Replacing");
        Box::pin(async move { Ok(input.replace(&self.old, &self.new)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uppercase() {
        let node = UppercaseNode::new("up");
        let mut ctx = Context::new();
        let out = node.execute("Hello World".into(), &mut ctx).await.unwrap();
        assert_eq!(out, "HELLO WORLD");
    }

    #[tokio::test]
    async fn test_trim() {
        let node = TrimNode::new("trim");
        let mut ctx = Context::new();
        let out = node
            .execute("   Hello World   ".into(), &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, "Hello World");
    }

    #[tokio::test]
    async fn test_reverse() {
        let node = ReverseNode::new("rev");
        let mut ctx = Context::new();
        let out = node.execute("Hello World".into(), &mut ctx).await.unwrap();
        assert_eq!(out, "dlroW olleH");
    }

    #[tokio::test]
    async fn test_replace() {
        let node = ReplaceNode::new("rep", "World".into(), "Boss".into());
        let mut ctx = Context::new();
        let out = node.execute("Hello World".into(), &mut ctx).await.unwrap();
        assert_eq!(out, "Hello Boss");
    }
}
