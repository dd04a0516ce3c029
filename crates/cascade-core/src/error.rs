use thiserror::Error;

#[derive(Debug, Error)]
pub enum CascadeError {
    // Construction-time errors — no partial pipeline is ever built
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    #[error("Invalid parameters for node '{node}': {message}")]
    InvalidNodeParameters { node: String, message: String },

    #[error("Malformed workflow: {0}")]
    MalformedWorkflow(String),

    // Execution-time errors — first failure aborts the run
    #[error("External service '{service}' failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("File access failed for '{path}': {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper attaching the failing node's identity before the error
    /// surfaces to the caller.
    #[error("Node '{id}' ({kind}) failed: {source}")]
    NodeFailed {
        id: String,
        kind: String,
        #[source]
        source: Box<CascadeError>,
    },

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CascadeError {
    /// Attach a node's id and kind to an execution error.
    pub fn in_node(self, id: &str, kind: &str) -> Self {
        Self::NodeFailed {
            id: id.to_string(),
            kind: kind.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CascadeError>;
