use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use cascade_core::error::CascadeError;
use cascade_core::types::SessionId;
use cascade_engine::{annotation, WorkflowEngine};

use crate::state::AppState;

// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Deserialize)]
pub struct RunRequest {
    pub input: String,
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Map an engine error to a response status. The node-attribution wrapper
/// is unwrapped first so the underlying kind decides.
fn status_for(err: &CascadeError) -> StatusCode {
    match err {
        CascadeError::NodeFailed { source, .. } => status_for(source),
        CascadeError::UnknownNodeKind(_)
        | CascadeError::InvalidNodeParameters { .. }
        | CascadeError::MalformedWorkflow(_) => StatusCode::BAD_REQUEST,
        CascadeError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// POST /api/run — execute a workflow, stream text + metering annotations
pub async fn run_workflow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequest>,
) -> Response {
    let workflow = body
        .workflow
        .unwrap_or_else(|| state.config.default_workflow.clone());
    let path = PathBuf::from(&state.config.workflow_dir).join(&workflow);
    if !path.exists() {
        return (
            StatusCode::NOT_FOUND,
            format!("workflow not found: {}", workflow),
        )
            .into_response();
    }

    let session_id = body
        .session_id
        .unwrap_or_else(|| SessionId::new().to_string());
    info!(session = %session_id, workflow = %workflow, "Workflow run requested");

    let engine = state.sessions.get_or_create(&session_id, &workflow, || {
        let spec = cascade_engine::graph::load_workflow(&path)?;
        WorkflowEngine::from_spec(&spec, &state.factory)
    });
    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            error!(session = %session_id, error = %e, "Workflow load failed");
            return (status_for(&e), e.to_string()).into_response();
        }
    };

    match engine.run(&body.input).await {
        Ok(outcome) => {
            let trailer = format!(
                "\n\n{}",
                annotation::emit(outcome.context.total_cost(), outcome.context.total_tokens())
            );
            let chunks = vec![Bytes::from(outcome.output), Bytes::from(trailer)];
            let stream = futures::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));

            let mut response = Response::new(Body::from_stream(stream));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            if let Ok(value) = HeaderValue::from_str(&session_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static("x-session-id"), value);
            }
            response
        }
        Err(e) => {
            error!(session = %session_id, error = %e, "Workflow run failed");
            (status_for(&e), e.to_string()).into_response()
        }
    }
}

// GET /api/sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "sessions": state.sessions.list() }))
}

// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    if id.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if state.sessions.remove(&id) {
        Json(serde_json::json!({ "message": format!("session {} deleted", id) })).into_response()
    } else {
        (StatusCode::NOT_FOUND, "session not found").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&CascadeError::UnknownNodeKind("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CascadeError::MalformedWorkflow("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CascadeError::ExternalService {
                service: "llm".into(),
                message: "timeout".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&CascadeError::Config("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_mapping_unwraps_node_attribution() {
        let err = CascadeError::ExternalService {
            service: "llm".into(),
            message: "timeout".into(),
        }
        .in_node("llm1", "llm");
        assert_eq!(status_for(&err), StatusCode::BAD_GATEWAY);
    }
}
