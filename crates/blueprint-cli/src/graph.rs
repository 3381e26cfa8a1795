use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use blueprint_core::GraphDocument;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node with label '{label}' has an empty id")]
    EmptyNodeId { label: String },

    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error("edge '{edge}' points at unknown node '{endpoint}'")]
    DanglingEdge { edge: String, endpoint: String },
}

/// Structural checks the export core relies on.
pub fn validate(doc: &GraphDocument) -> Result<(), GraphError> {
    let mut ids = HashSet::new();
    for node in &doc.nodes {
        if node.id.trim().is_empty() {
            return Err(GraphError::EmptyNodeId {
                label: node.label.clone(),
            });
        }
        if !ids.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }
    for edge in &doc.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(GraphError::DanglingEdge {
                    edge: edge.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

pub fn load_graph(path: &Path) -> Result<GraphDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: GraphDocument =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    validate(&doc).with_context(|| format!("invalid graph in {}", path.display()))?;
    tracing::debug!(nodes = doc.nodes.len(), edges = doc.edges.len(), "loaded graph");
    Ok(doc)
}

/// JSON Schema of the graph document, pretty-printed.
pub fn schema_json() -> Result<String> {
    let schema = schemars::schema_for!(GraphDocument);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::{ComponentType, Edge, Node};

    fn doc(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphDocument {
        GraphDocument {
            project_name: "Shop".to_string(),
            nodes,
            edges,
        }
    }

    #[test]
    fn accepts_consistent_graph() {
        let d = doc(
            vec![
                Node::new("a", ComponentType::Backend, "API"),
                Node::new("b", ComponentType::Storage, "DB"),
            ],
            vec![Edge::new("e", "a", "b")],
        );
        assert_eq!(validate(&d), Ok(()));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let d = doc(
            vec![
                Node::new("a", ComponentType::Backend, "API"),
                Node::new("a", ComponentType::Storage, "DB"),
            ],
            vec![],
        );
        assert_eq!(validate(&d), Err(GraphError::DuplicateNodeId("a".to_string())));
    }

    #[test]
    fn rejects_dangling_edges() {
        let d = doc(vec![Node::new("a", ComponentType::Backend, "API")], vec![Edge::new("e", "a", "zz")]);
        assert_eq!(
            validate(&d),
            Err(GraphError::DanglingEdge {
                edge: "e".to_string(),
                endpoint: "zz".to_string()
            })
        );
    }

    #[test]
    fn schema_names_graph_fields() {
        let schema = schema_json().unwrap();
        assert!(schema.contains("projectName"));
        assert!(schema.contains("techStack") || schema.contains("techStackLabels"));
    }
}
