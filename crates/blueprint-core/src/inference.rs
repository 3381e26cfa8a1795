//! Build order and integration inference.
//!
//! Both are derived from component types alone. Edges describe runtime
//! communication, not build dependencies, so they never influence ordering.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::artifact::{component_file_name, plan_named, ArtifactJob};
use crate::registry::{detect_language, resolve_packages, Language, PackageCoordinate};
use crate::{find_node, label_of, ComponentType, Edge, Node};

/// Generic label for type pairs without a dedicated pattern.
pub const GENERIC_PATTERN: &str = "Component integration";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BuildPhase {
    Foundation,
    Core,
    Integration,
}

impl BuildPhase {
    pub const ALL: [BuildPhase; 3] = [BuildPhase::Foundation, BuildPhase::Core, BuildPhase::Integration];

    pub fn of(component_type: ComponentType) -> BuildPhase {
        match component_type.rank() {
            1 | 2 => BuildPhase::Foundation,
            3 | 4 => BuildPhase::Core,
            _ => BuildPhase::Integration,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            BuildPhase::Foundation => 1,
            BuildPhase::Core => 2,
            BuildPhase::Integration => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            BuildPhase::Foundation => "Foundation",
            BuildPhase::Core => "Core",
            BuildPhase::Integration => "Integration",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            BuildPhase::Foundation => "data stores and identity that everything else relies on",
            BuildPhase::Core => "services and user interfaces that carry the product",
            BuildPhase::Integration => "third-party services and background processing",
        }
    }
}

/// Node ids in one build phase, in input order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseGroup {
    pub phase: BuildPhase,
    pub node_ids: Vec<String>,
}

/// Group nodes into the three build phases. All phases are returned, in
/// order, even when empty. Input order is kept inside each phase.
pub fn build_phases(nodes: &[Node]) -> Vec<PhaseGroup> {
    BuildPhase::ALL
        .iter()
        .map(|&phase| PhaseGroup {
            phase,
            node_ids: nodes
                .iter()
                .filter(|n| BuildPhase::of(n.component_type) == phase)
                .map(|n| n.id.clone())
                .collect(),
        })
        .collect()
}

/// Communication pattern between two connected component types. Total over
/// every ordered pair.
pub fn infer_pattern(source: ComponentType, target: ComponentType) -> &'static str {
    use ComponentType::*;
    match source {
        Frontend => match target {
            Backend => "HTTP/REST API",
            Auth => "Auth redirect/session flow",
            External => "Client SDK/embed",
            Frontend | Storage | Background => GENERIC_PATTERN,
        },
        Backend => match target {
            Storage => "ORM/query access",
            Auth => "Token validation",
            External => "API client/SDK",
            Backend => "Service-to-service call",
            Background => "Job queue/enqueue",
            Frontend => GENERIC_PATTERN,
        },
        Storage => match target {
            Frontend | Backend | Storage | Auth | External | Background => GENERIC_PATTERN,
        },
        Auth => match target {
            Storage => "Credential lookup",
            External => "Identity provider federation",
            Frontend | Backend | Auth | Background => GENERIC_PATTERN,
        },
        External => match target {
            Backend => "Webhook callback",
            Background => "Webhook/event trigger",
            Frontend | Storage | Auth | External => GENERIC_PATTERN,
        },
        Background => match target {
            Storage => "Direct data access",
            External => "API client/SDK",
            Backend => "Internal API callback",
            Frontend | Auth | Background => GENERIC_PATTERN,
        },
    }
}

/// One row of the integration table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRow {
    pub edge_id: String,
    pub source_id: String,
    pub target_id: String,
    pub source_label: String,
    pub target_label: String,
    pub pattern: &'static str,
    /// User edge label, kept as a free-form note. Never changes the pattern.
    pub note: Option<String>,
}

/// One row per edge. Endpoints missing from `nodes` render with their raw id
/// and the generic pattern.
pub fn integration_rows(nodes: &[Node], edges: &[Edge]) -> Vec<IntegrationRow> {
    edges.iter().map(|edge| integration_row(edge, nodes)).collect()
}

fn integration_row(edge: &Edge, nodes: &[Node]) -> IntegrationRow {
    let source = find_node(nodes, &edge.source);
    let target = find_node(nodes, &edge.target);
    let pattern = match (source, target) {
        (Some(s), Some(t)) => infer_pattern(s.component_type, t.component_type),
        _ => GENERIC_PATTERN,
    };
    IntegrationRow {
        edge_id: edge.id.clone(),
        source_id: edge.source.clone(),
        target_id: edge.target.clone(),
        source_label: label_of(&edge.source, nodes).to_string(),
        target_label: label_of(&edge.target, nodes).to_string(),
        pattern,
        note: edge.label_text().map(str::to_string),
    }
}

/// Registry outcome for one tech label on one node.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TechResolution {
    pub label: String,
    /// Empty when the label has no registry entry.
    pub packages: &'static [PackageCoordinate],
}

impl TechResolution {
    pub fn is_resolved(&self) -> bool {
        !self.packages.is_empty()
    }
}

/// Facts shared by every artifact of one export. Pure function of its inputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub project_name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub build_phases: Vec<PhaseGroup>,
    pub integration_rows: Vec<IntegrationRow>,
    pub languages_by_node: BTreeMap<String, Language>,
    pub packages_by_node: BTreeMap<String, Vec<TechResolution>>,
    /// Spec path per node id. Defaults to [`component_file_name`].
    pub file_names: BTreeMap<String, String>,
}

/// Language of a node and the packages behind each of its tech labels.
fn resolve_node(node: &Node) -> (Option<Language>, Vec<TechResolution>) {
    let language = detect_language(node.tech_stack_labels.as_slice());
    let resolved = node
        .tech_stack_labels
        .iter()
        .map(|label| TechResolution {
            label: label.clone(),
            packages: resolve_packages(label, language),
        })
        .collect();
    (language, resolved)
}

impl GenerationContext {
    pub fn build(project_name: &str, nodes: &[Node], edges: &[Edge]) -> Self {
        let mut languages_by_node = BTreeMap::new();
        let mut packages_by_node = BTreeMap::new();
        let mut file_names = BTreeMap::new();
        for node in nodes {
            let (language, resolved) = resolve_node(node);
            if let Some(lang) = language {
                languages_by_node.insert(node.id.clone(), lang);
            }
            packages_by_node.insert(node.id.clone(), resolved);
            file_names.insert(node.id.clone(), component_file_name(node));
        }

        let ctx = Self {
            project_name: project_name.trim().to_string(),
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
            build_phases: build_phases(nodes),
            integration_rows: integration_rows(nodes, edges),
            languages_by_node,
            packages_by_node,
            file_names,
        };
        tracing::debug!(
            nodes = ctx.nodes.len(),
            edges = ctx.edges.len(),
            unresolved = ctx.unresolved_labels().len(),
            "built generation context"
        );
        ctx
    }

    /// Replace spec paths for the given node ids. Every document rendered
    /// from this context links to the replaced paths.
    pub fn with_file_names(mut self, names: impl IntoIterator<Item = (String, String)>) -> Self {
        self.file_names.extend(names);
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        find_node(&self.nodes, id)
    }

    pub fn file_name(&self, node: &Node) -> String {
        self.file_names
            .get(&node.id)
            .cloned()
            .unwrap_or_else(|| component_file_name(node))
    }

    /// Jobs of this export in bundle order: rules, protocol, then one per
    /// node, named by [`Self::file_name`].
    pub fn artifact_plan(&self) -> Vec<ArtifactJob> {
        plan_named(&self.nodes, |node| self.file_name(node))
    }

    pub fn phase_nodes(&self, phase: BuildPhase) -> impl Iterator<Item = &Node> + '_ {
        self.build_phases
            .iter()
            .filter(move |g| g.phase == phase)
            .flat_map(|g| g.node_ids.iter())
            .filter_map(move |id| self.node(id))
    }

    pub fn packages_for(&self, node_id: &str) -> &[TechResolution] {
        self.packages_by_node
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolutions for `node`'s own labels. Cached when `node` is the graph's
    /// copy, resolved on the spot otherwise.
    pub fn resolutions_for<'a>(&'a self, node: &Node) -> Cow<'a, [TechResolution]> {
        match self.node(&node.id) {
            Some(known) if known == node => Cow::Borrowed(self.packages_for(&node.id)),
            _ => Cow::Owned(resolve_node(node).1),
        }
    }

    /// Language of `node`, with the same fallback as [`Self::resolutions_for`].
    pub fn language_for(&self, node: &Node) -> Option<Language> {
        match self.node(&node.id) {
            Some(known) if known == node => self.language_of(&node.id),
            _ => detect_language(node.tech_stack_labels.as_slice()),
        }
    }

    pub fn language_of(&self, node_id: &str) -> Option<Language> {
        self.languages_by_node.get(node_id).copied()
    }

    /// Detected languages across the graph, in order of first appearance.
    pub fn languages(&self) -> Vec<Language> {
        let mut out: Vec<Language> = Vec::new();
        for node in &self.nodes {
            if let Some(lang) = self.language_of(&node.id) {
                if !out.contains(&lang) {
                    out.push(lang);
                }
            }
        }
        out
    }

    /// Component types present in the graph, in `ComponentType::ALL` order.
    pub fn present_types(&self) -> Vec<ComponentType> {
        ComponentType::ALL
            .into_iter()
            .filter(|t| self.nodes.iter().any(|n| n.component_type == *t))
            .collect()
    }

    /// Rows whose edge touches `node_id`, split into (outbound, inbound).
    pub fn connections_of(&self, node_id: &str) -> (Vec<&IntegrationRow>, Vec<&IntegrationRow>) {
        let outbound = self.integration_rows.iter().filter(|r| r.source_id == node_id).collect();
        let inbound = self.integration_rows.iter().filter(|r| r.target_id == node_id).collect();
        (outbound, inbound)
    }

    /// `(node label, tech label)` for every label without a registry entry.
    pub fn unresolved_labels(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|n| {
                self.packages_for(&n.id)
                    .iter()
                    .filter(|r| !r.is_resolved())
                    .map(move |r| (n.label.as_str(), r.label.as_str()))
            })
            .collect()
    }

    /// Distinct tech labels across the graph, in order of first appearance.
    pub fn stack_labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for label in self.nodes.iter().flat_map(|n| n.tech_stack_labels.iter()) {
            let label = label.trim();
            if !label.is_empty() && !out.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                out.push(label);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComponentType::*;

    fn one_of_each() -> Vec<Node> {
        vec![
            Node::new("f", Frontend, "Web"),
            Node::new("b", Backend, "API"),
            Node::new("s", Storage, "DB"),
            Node::new("a", Auth, "Auth"),
            Node::new("e", External, "Stripe"),
            Node::new("w", Background, "Worker"),
        ]
    }

    fn ids(group: &PhaseGroup) -> Vec<&str> {
        group.node_ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn phases_follow_type_rank() {
        let phases = build_phases(&one_of_each());
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].phase, BuildPhase::Foundation);
        assert_eq!(phases[1].phase, BuildPhase::Core);
        assert_eq!(phases[2].phase, BuildPhase::Integration);

        let mut foundation = ids(&phases[0]);
        foundation.sort();
        assert_eq!(foundation, vec!["a", "s"]);
        let mut core = ids(&phases[1]);
        core.sort();
        assert_eq!(core, vec!["b", "f"]);
        let mut integration = ids(&phases[2]);
        integration.sort();
        assert_eq!(integration, vec!["e", "w"]);
    }

    #[test]
    fn phases_keep_input_order() {
        let nodes = vec![
            Node::new("2", Frontend, "Admin"),
            Node::new("1", Backend, "API"),
            Node::new("3", Frontend, "Site"),
        ];
        let phases = build_phases(&nodes);
        assert_eq!(ids(&phases[1]), vec!["2", "1", "3"]);
    }

    #[test]
    fn edges_do_not_affect_order() {
        let nodes = one_of_each();
        let edges = vec![Edge::new("e1", "s", "w"), Edge::new("e2", "a", "f")];
        let ctx = GenerationContext::build("p", &nodes, &edges);
        assert_eq!(ctx.build_phases, build_phases(&nodes));
    }

    #[test]
    fn empty_graph_still_has_three_phases() {
        let phases = build_phases(&[]);
        assert_eq!(phases.len(), 3);
        assert!(phases.iter().all(|g| g.node_ids.is_empty()));
    }

    #[test]
    fn pattern_is_total() {
        for s in ComponentType::ALL {
            for t in ComponentType::ALL {
                assert!(!infer_pattern(s, t).is_empty(), "{s}->{t}");
            }
        }
    }

    #[test]
    fn documented_patterns() {
        assert_eq!(infer_pattern(Frontend, Backend), "HTTP/REST API");
        assert_eq!(infer_pattern(Backend, Storage), "ORM/query access");
        assert_eq!(infer_pattern(Backend, Auth), "Token validation");
        assert_eq!(infer_pattern(Auth, Storage), "Credential lookup");
        assert_eq!(infer_pattern(Background, Storage), "Direct data access");
        assert_eq!(infer_pattern(Backend, External), "API client/SDK");
    }

    #[test]
    fn unusual_pair_falls_back_to_generic() {
        assert_eq!(infer_pattern(Storage, Frontend), GENERIC_PATTERN);
        assert_eq!(infer_pattern(Frontend, Storage), GENERIC_PATTERN);
    }

    #[test]
    fn edge_label_is_a_note_not_a_pattern() {
        let nodes = vec![Node::new("a", Backend, "API"), Node::new("d", Storage, "DB")];
        let edges = vec![Edge::new("e", "a", "d").with_label("HTTP/REST API")];
        let rows = integration_rows(&nodes, &edges);
        assert_eq!(rows[0].pattern, "ORM/query access");
        assert_eq!(rows[0].note.as_deref(), Some("HTTP/REST API"));
    }

    #[test]
    fn dangling_endpoint_does_not_panic() {
        let nodes = vec![Node::new("a", Backend, "API")];
        let rows = integration_rows(&nodes, &[Edge::new("e", "a", "ghost")]);
        assert_eq!(rows[0].target_label, "ghost");
        assert_eq!(rows[0].pattern, GENERIC_PATTERN);
    }

    #[test]
    fn context_resolves_packages_per_node() {
        let nodes = vec![
            Node::new("db", Storage, "Postgres DB").with_tech(["PostgreSQL"]),
            Node::new("api", Backend, "API").with_tech(["Express", "PostgreSQL", "Made-up ORM"]),
        ];
        let ctx = GenerationContext::build("Shop", &nodes, &[]);

        assert_eq!(ctx.language_of("db"), None);
        assert_eq!(ctx.packages_for("db")[0].packages[0].name, "postgres");

        assert_eq!(ctx.language_of("api"), Some(Language::JavaScript));
        let api = ctx.packages_for("api");
        assert_eq!(api[0].packages[0].name, "express");
        assert_eq!(api[1].packages[0].name, "pg");
        assert!(!api[2].is_resolved());

        assert_eq!(ctx.unresolved_labels(), vec![("API", "Made-up ORM")]);
        assert_eq!(ctx.stack_labels(), vec!["PostgreSQL", "Express", "Made-up ORM"]);
    }

    #[test]
    fn node_outside_the_graph_resolves_its_own_labels() {
        let nodes = vec![Node::new("api", Backend, "API")];
        let ctx = GenerationContext::build("Shop", &nodes, &[]);
        assert!(ctx.resolutions_for(&nodes[0]).is_empty());

        let updated = Node::new("api", Backend, "API").with_tech(["Express"]);
        assert_eq!(ctx.resolutions_for(&updated)[0].packages[0].name, "express");
        assert_eq!(ctx.language_for(&updated), Some(Language::JavaScript));
        let stranger = Node::new("jobs", Background, "Jobs").with_tech(["Express"]);
        assert_eq!(ctx.resolutions_for(&stranger)[0].packages[0].name, "express");
    }

    #[test]
    fn replaced_file_names_drive_the_plan() {
        let nodes = vec![Node::new("n1", Backend, "API"), Node::new("n2", Backend, "api")];
        let ctx = GenerationContext::build("Shop", &nodes, &[])
            .with_file_names([("n2".to_string(), "specs/api-n2.md".to_string())]);
        let names: Vec<String> = ctx.artifact_plan().into_iter().map(|j| j.name).collect();
        assert_eq!(
            names,
            vec!["project-rules.md", "agent-protocol.md", "specs/api.md", "specs/api-n2.md"]
        );
        assert_eq!(ctx.file_name(&nodes[1]), "specs/api-n2.md");
    }

    #[test]
    fn context_is_deterministic() {
        let nodes = one_of_each();
        let edges = vec![Edge::new("e1", "f", "b"), Edge::new("e2", "b", "s")];
        let a = serde_json::to_string(&GenerationContext::build("p", &nodes, &edges)).unwrap();
        let b = serde_json::to_string(&GenerationContext::build("p", &nodes, &edges)).unwrap();
        assert_eq!(a, b);
    }
}
