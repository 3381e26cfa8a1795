pub mod artifact;
pub mod inference;
pub mod registry;
pub mod render;
pub mod rules;
pub mod taxonomy;

use serde::{Deserialize, Serialize};

pub use artifact::{plan_artifacts, slugify, Artifact, ArtifactJob, ArtifactKind, ArtifactSet, NameCollision};
pub use inference::{
    build_phases, infer_pattern, integration_rows, BuildPhase, GenerationContext, IntegrationRow,
    PhaseGroup, TechResolution,
};
pub use registry::{detect_language, resolve_packages, Language, PackageCoordinate, RegistryKind};
pub use render::{render_agent_protocol, render_artifact, render_component_spec, render_project_rules};

// --- Types ---

/// The architectural role of a node. Closed set: every behaviour keyed on it
/// lives in an exhaustive `match`, so adding a variant fails to compile until
/// each table covers it.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Frontend,
    Backend,
    Storage,
    Auth,
    External,
    Background,
}

impl ComponentType {
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Frontend,
        ComponentType::Backend,
        ComponentType::Storage,
        ComponentType::Auth,
        ComponentType::External,
        ComponentType::Background,
    ];

    /// Build rank, 1 (built first) to 6.
    pub fn rank(self) -> u8 {
        match self {
            ComponentType::Storage => 1,
            ComponentType::Auth => 2,
            ComponentType::Backend => 3,
            ComponentType::Frontend => 4,
            ComponentType::External => 5,
            ComponentType::Background => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Frontend => "frontend",
            ComponentType::Backend => "backend",
            ComponentType::Storage => "storage",
            ComponentType::Auth => "auth",
            ComponentType::External => "external",
            ComponentType::Background => "background",
        }
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }

    pub fn description(self) -> &'static str {
        self.profile().description
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Opaque identifier, unique within a graph
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display labels picked from the tech catalogue, e.g. "PostgreSQL", "Express".
    /// Not guaranteed to exist in the package registry.
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "techStack")]
    pub tech_stack_labels: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, component_type: ComponentType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type,
            label: label.into(),
            description: None,
            tech_stack_labels: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tech<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tech_stack_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Description with surrounding whitespace removed, `None` if blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// A directed runtime relationship. Arrow points from the caller to the callee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(alias = "sourceNodeId")]
    pub source: String,
    #[serde(alias = "targetNodeId")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label with surrounding whitespace removed, `None` if blank.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// On-disk form of a sketched architecture.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub project_name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Find a node by id.
pub fn find_node<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    nodes.iter().find(|n| n.id == id)
}

/// Display label for a node id, falling back to the raw id.
pub fn label_of<'a>(id: &'a str, nodes: &'a [Node]) -> &'a str {
    find_node(nodes, id).map(|n| n.label.as_str()).unwrap_or(id)
}
