use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cascade_core::error::Result;

use crate::engine::WorkflowEngine;

struct SessionEntry {
    engine: Arc<WorkflowEngine>,
    workflow: String,
    last_active: chrono::DateTime<chrono::Utc>,
}

/// Tracks one engine instance per session so Memory nodes survive across
/// requests within a process. Ephemeral by design: nothing outlives a
/// restart, and sessions are never shared between concurrent runs of
/// different ids.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session's engine, building one on first use. A session that
    /// switches workflows gets a fresh engine (and fresh memory).
    pub fn get_or_create(
        &self,
        session_id: &str,
        workflow: &str,
        build: impl FnOnce() -> Result<WorkflowEngine>,
    ) -> Result<Arc<WorkflowEngine>> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(entry) = sessions.get_mut(session_id) {
            if entry.workflow == workflow {
                entry.last_active = chrono::Utc::now();
                return Ok(entry.engine.clone());
            }
        }

        let engine = Arc::new(build()?);
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                engine: engine.clone(),
                workflow: workflow.to_string(),
                last_active: chrono::Utc::now(),
            },
        );
        Ok(engine)
    }

    /// Active session ids, most recently used first.
    pub fn list(&self) -> Vec<String> {
        let sessions = self.sessions.lock().unwrap();
        let mut entries: Vec<_> = sessions
            .iter()
            .map(|(id, e)| (id.clone(), e.last_active))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().map(|(id, _)| id).collect()
    }

    /// Drop a session. Returns false when the id was unknown.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().unwrap().remove(session_id).is_some()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
