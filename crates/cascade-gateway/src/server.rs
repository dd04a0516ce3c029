use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use cascade_core::config::GatewayConfig;

use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Run the gateway server until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/api/health", get(routes::health))
            .route("/api/run", post(routes::run_workflow))
            .route("/api/sessions", get(routes::list_sessions))
            .route("/api/sessions/{id}", delete(routes::delete_session))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone());

        let listener = TcpListener::bind(&self.config.bind).await?;
        info!(bind = %self.config.bind, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}
