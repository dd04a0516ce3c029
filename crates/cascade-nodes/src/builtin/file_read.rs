use futures::future::BoxFuture;
use tracing::{debug, error};

use cascade_core::context::{keys, Context};
use cascade_core::error::{CascadeError, Result};
use cascade_core::traits::Node;

/// Reads a file into the context under `file_content` and passes its
/// input through unchanged. A read failure aborts the run.
pub struct FileReadNode {
    id: String,
    file_path: String,
}

impl FileReadNode {
    pub fn new(id: &str, file_path: String) -> Self {
        Self {
            id: id.to_string(),
            file_path,
        }
    }
}

impl Node for FileReadNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "file_read"
    }

    fn execute<'a>(&'a self, input: String, ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            debug!(node = %self.id, path = %self.file_path, "Reading file");
            let content = std::fs::read_to_string(&self.file_path).map_err(|e| {
                error!(node = %self.id, path = %self.file_path, error = %e, "File read failed");
                CascadeError::FileAccess {
                    path: self.file_path.clone(),
                    source: e,
                }
            })?;
            ctx.set(keys::FILE_CONTENT, content);
            Ok(input)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_into_context_and_passes_input_through() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reference text").unwrap();

        let node = FileReadNode::new("f1", file.path().display().to_string());
        let mut ctx = Context::new();
        let out = node.execute("unchanged".into(), &mut ctx).await.unwrap();

        assert_eq!(out, "unchanged");
        assert_eq!(ctx.text(keys::FILE_CONTENT), Some("reference text\n"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let node = FileReadNode::new("f1", "/nonexistent/notes.txt".into());
        let mut ctx = Context::new();
        let err = node.execute("x".into(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, CascadeError::FileAccess { .. }));
        assert!(!ctx.contains(keys::FILE_CONTENT));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let node = FileReadNode::new("f1", file.path().display().to_string());
        let mut ctx = Context::new();
        let out = node.execute(String::new(), &mut ctx).await.unwrap();
        assert_eq!(out, "");
        assert_eq!(ctx.text(keys::FILE_CONTENT), Some(""));
    }
}
