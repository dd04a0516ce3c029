use std::sync::Arc;

use cascade_core::config::AppConfig;
use cascade_engine::SessionManager;
use cascade_nodes::NodeFactory;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: AppConfig,
    pub factory: Arc<NodeFactory>,
    pub sessions: Arc<SessionManager>,
}
