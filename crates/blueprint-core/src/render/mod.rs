//! Deterministic document rendering.
//!
//! Every function here is pure and total: any graph, including the empty one,
//! renders every section. Facts that cannot be derived from the graph are
//! written as inline markers instead of being guessed.

mod component;
mod protocol;
mod project;

use crate::artifact::{ArtifactJob, ArtifactKind};
use crate::inference::GenerationContext;
use crate::{Edge, Node};

pub use component::{tech_stack_lines, type_fields, SpecField, SPEC_SECTIONS};
pub use project::{constraints, integration_table, language_standards, CODE_STANDARDS_FALLBACK, RULES_SECTIONS};
pub use protocol::PROTOCOL_SECTIONS;

pub const NEEDS_INPUT: &str = "NEEDS INPUT";
pub const NEEDS_CONFIRMATION: &str = "NEEDS CONFIRMATION";

/// Marker for prose the sketch does not provide.
pub fn needs_input(what: &str) -> String {
    format!("[{NEEDS_INPUT}: {what}]")
}

/// Marker for a technology with no verified package.
pub fn needs_confirmation(what: &str) -> String {
    format!("[{NEEDS_CONFIRMATION}: {what}]")
}

/// Project name as shown in headings.
pub fn display_project_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        needs_input("project name")
    } else {
        name.to_string()
    }
}

/// Required first line of the rules file.
pub fn rules_heading(project_name: &str) -> String {
    format!("# {} Project Rules", display_project_name(project_name))
}

/// Required first line of the protocol file.
pub fn protocol_heading(project_name: &str) -> String {
    format!("# {} Agent Protocol", display_project_name(project_name))
}

/// Required first line of a component spec.
pub fn component_heading(node: &Node) -> String {
    let label = node.label.trim();
    if label.is_empty() {
        format!("# {} Component Spec", needs_input("component name"))
    } else {
        format!("# {label} Component Spec")
    }
}

/// Heading an artifact must start with, used by both generation paths.
pub fn required_heading(job: &ArtifactJob, ctx: &GenerationContext) -> String {
    match &job.kind {
        ArtifactKind::Rules => rules_heading(&ctx.project_name),
        ArtifactKind::Protocol => protocol_heading(&ctx.project_name),
        ArtifactKind::Component(id) => match ctx.node(id) {
            Some(node) => component_heading(node),
            None => format!("# {id} Component Spec"),
        },
    }
}

pub fn render_project_rules(nodes: &[Node], edges: &[Edge], project_name: &str) -> String {
    project::render(&GenerationContext::build(project_name, nodes, edges))
}

pub fn render_agent_protocol(nodes: &[Node], edges: &[Edge], project_name: &str) -> String {
    protocol::render(&GenerationContext::build(project_name, nodes, edges))
}

pub fn render_component_spec(node: &Node, edges: &[Edge], all_nodes: &[Node]) -> String {
    let ctx = GenerationContext::build("", all_nodes, edges);
    component::render(node, &ctx)
}

/// Render one planned artifact from a prepared context.
pub fn render_artifact(job: &ArtifactJob, ctx: &GenerationContext) -> String {
    match &job.kind {
        ArtifactKind::Rules => project::render(ctx),
        ArtifactKind::Protocol => protocol::render(ctx),
        ArtifactKind::Component(id) => match ctx.node(id) {
            Some(node) => component::render(node, ctx),
            None => format!(
                "# {id} Component Spec\n\n{}\n",
                needs_input(&format!("component `{id}` is not part of this graph"))
            ),
        },
    }
}

/// Escape a value for use inside a Markdown table cell.
pub(crate) fn cell(value: &str) -> String {
    let value = value.trim().replace('|', "\\|").replace('\n', " ");
    if value.is_empty() {
        "-".to_string()
    } else {
        value
    }
}

pub(crate) fn push_bullets<S: AsRef<str>>(out: &mut String, items: &[S]) {
    for item in items {
        out.push_str("- ");
        out.push_str(item.as_ref());
        out.push('\n');
    }
}
