use std::collections::{HashMap, HashSet};
use std::path::Path;

use cascade_core::error::{CascadeError, Result};
use cascade_core::types::WorkflowSpec;

/// Load a persisted workflow from a JSON file.
pub fn load_workflow(path: &Path) -> Result<WorkflowSpec> {
    let raw = std::fs::read_to_string(path)?;
    let spec: WorkflowSpec = serde_json::from_str(&raw)
        .map_err(|e| CascadeError::MalformedWorkflow(format!("{}: {}", path.display(), e)))?;
    Ok(spec)
}

fn malformed(message: impl Into<String>) -> CascadeError {
    CascadeError::MalformedWorkflow(message.into())
}

/// Validate that the connection list forms a single linear chain covering
/// every node id exactly once, and return the node ids in execution order.
///
/// This engine is not a DAG executor: connections encode only linear
/// order, node i feeding node i+1.
pub fn chain_order(spec: &WorkflowSpec) -> Result<Vec<String>> {
    if spec.nodes.is_empty() {
        return Err(malformed("workflow has no nodes"));
    }

    let ids: HashSet<&str> = spec.nodes.iter().map(|n| n.id.as_str()).collect();
    if ids.len() != spec.nodes.len() {
        return Err(malformed("duplicate node ids"));
    }

    // A chain of n nodes has exactly n-1 edges.
    if spec.connections.len() != spec.nodes.len() - 1 {
        return Err(malformed(format!(
            "expected {} connections for {} nodes, found {}",
            spec.nodes.len() - 1,
            spec.nodes.len(),
            spec.connections.len()
        )));
    }

    let mut next: HashMap<&str, &str> = HashMap::new();
    let mut targets: HashSet<&str> = HashSet::new();
    for conn in &spec.connections {
        if !ids.contains(conn.from.as_str()) {
            return Err(malformed(format!("connection from unknown node '{}'", conn.from)));
        }
        if !ids.contains(conn.to.as_str()) {
            return Err(malformed(format!("connection to unknown node '{}'", conn.to)));
        }
        if next.insert(conn.from.as_str(), conn.to.as_str()).is_some() {
            return Err(malformed(format!("node '{}' has multiple outgoing connections", conn.from)));
        }
        if !targets.insert(conn.to.as_str()) {
            return Err(malformed(format!("node '{}' has multiple incoming connections", conn.to)));
        }
    }

    // Exactly one head: a node that is never a connection target.
    let mut heads = ids.iter().filter(|id| !targets.contains(*id));
    let head = heads
        .next()
        .ok_or_else(|| malformed("connections form a cycle"))?;
    if heads.next().is_some() {
        return Err(malformed("connections do not form a single chain"));
    }

    let mut order = Vec::with_capacity(spec.nodes.len());
    let mut current = *head;
    loop {
        order.push(current.to_string());
        match next.get(current) {
            Some(following) => current = *following,
            None => break,
        }
    }

    // Edge/head counts guarantee this unless the edges split off a cycle.
    if order.len() != spec.nodes.len() {
        return Err(malformed("connections do not cover every node"));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::types::{Connection, NodeSpec};

    fn node(id: &str) -> NodeSpec {
        NodeSpec {
            id: id.to_string(),
            kind: "trim".to_string(),
            params: Default::default(),
        }
    }

    fn conn(from: &str, to: &str) -> Connection {
        Connection {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn spec(nodes: Vec<NodeSpec>, connections: Vec<Connection>) -> WorkflowSpec {
        WorkflowSpec {
            flow_name: "test".to_string(),
            nodes,
            connections,
        }
    }

    #[test]
    fn test_valid_chain_ordered_by_connections() {
        // Declared order differs from chain order; connections win.
        let s = spec(
            vec![node("c"), node("a"), node("b")],
            vec![conn("a", "b"), conn("b", "c")],
        );
        assert_eq!(chain_order(&s).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_node_no_connections() {
        let s = spec(vec![node("only")], vec![]);
        assert_eq!(chain_order(&s).unwrap(), vec!["only"]);
    }

    #[test]
    fn test_empty_workflow_rejected() {
        let s = spec(vec![], vec![]);
        assert!(matches!(
            chain_order(&s).unwrap_err(),
            CascadeError::MalformedWorkflow(_)
        ));
    }

    #[test]
    fn test_disconnected_nodes_rejected() {
        let s = spec(vec![node("a"), node("b")], vec![]);
        assert!(chain_order(&s).is_err());
    }

    #[test]
    fn test_branching_rejected() {
        let s = spec(
            vec![node("a"), node("b"), node("c")],
            vec![conn("a", "b"), conn("a", "c")],
        );
        assert!(chain_order(&s).is_err());
    }

    #[test]
    fn test_cycle_rejected() {
        let s = spec(
            vec![node("a"), node("b")],
            vec![conn("a", "b"), conn("b", "a")],
        );
        assert!(chain_order(&s).is_err());
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let s = spec(vec![node("a"), node("b")], vec![conn("a", "ghost")]);
        assert!(chain_order(&s).is_err());
    }
}
