//! Artifact naming and the export plan.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::Node;

pub const RULES_FILE: &str = "project-rules.md";
pub const PROTOCOL_FILE: &str = "agent-protocol.md";
pub const SPECS_DIR: &str = "specs";

/// Lowercase, collapse every run of non-alphanumeric characters into a single
/// hyphen, trim hyphens from both ends.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Spec path for a component: `specs/<slug>.md`, falling back to the node id
/// and then to `component` when the label has no usable characters.
pub fn component_file_name(node: &Node) -> String {
    let slug = [slugify(&node.label), slugify(&node.id)]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "component".to_string());
    format!("{SPECS_DIR}/{slug}.md")
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", tag = "kind", content = "nodeId")]
pub enum ArtifactKind {
    Rules,
    Protocol,
    Component(String),
}

impl ArtifactKind {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ArtifactKind::Component(id) => Some(id),
            ArtifactKind::Rules | ArtifactKind::Protocol => None,
        }
    }
}

/// One unit of work in an export: which artifact to produce and where it goes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtifactJob {
    pub kind: ArtifactKind,
    pub name: String,
}

/// The `2 + |nodes|` jobs of an export, in bundle order: rules, protocol,
/// then one per node in input order.
pub fn plan_artifacts(nodes: &[Node]) -> Vec<ArtifactJob> {
    plan_named(nodes, component_file_name)
}

pub(crate) fn plan_named(nodes: &[Node], file_name: impl Fn(&Node) -> String) -> Vec<ArtifactJob> {
    let mut jobs = Vec::with_capacity(nodes.len() + 2);
    jobs.push(ArtifactJob {
        kind: ArtifactKind::Rules,
        name: RULES_FILE.to_string(),
    });
    jobs.push(ArtifactJob {
        kind: ArtifactKind::Protocol,
        name: PROTOCOL_FILE.to_string(),
    });
    jobs.extend(nodes.iter().map(|node| ArtifactJob {
        kind: ArtifactKind::Component(node.id.clone()),
        name: file_name(node),
    }));
    jobs
}

/// A generated file. Immutable once produced.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub content: String,
}

impl Artifact {
    pub fn new(job: &ArtifactJob, content: String) -> Self {
        Self {
            name: job.name.clone(),
            kind: job.kind.clone(),
            content,
        }
    }
}

/// Two or more artifacts that would be written to the same path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NameCollision {
    pub name: String,
    /// Node ids of the colliding component specs, in bundle order.
    pub node_ids: Vec<String>,
}

/// A complete bundle.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn rules(&self) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == ArtifactKind::Rules)
    }

    pub fn protocol(&self) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == ArtifactKind::Protocol)
    }

    pub fn component(&self, node_id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind.node_id() == Some(node_id))
    }

    /// Names used by more than one artifact. Resolving them is up to the caller.
    pub fn collisions(&self) -> Vec<NameCollision> {
        let mut by_name: BTreeMap<&str, Vec<&Artifact>> = BTreeMap::new();
        for artifact in &self.artifacts {
            by_name.entry(artifact.name.as_str()).or_default().push(artifact);
        }
        by_name
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(name, group)| NameCollision {
                name: name.to_string(),
                node_ids: group
                    .iter()
                    .filter_map(|a| a.kind.node_id().map(str::to_string))
                    .collect(),
            })
            .collect()
    }
}

impl IntoIterator for ArtifactSet {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}
