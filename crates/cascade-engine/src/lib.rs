pub mod annotation;
pub mod engine;
pub mod graph;
pub mod session;

pub use annotation::AnnotatedOutput;
pub use engine::{RunOutcome, WorkflowEngine};
pub use session::SessionManager;
