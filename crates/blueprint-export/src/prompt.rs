use blueprint_core::render::{
    constraints, integration_table, language_standards, required_heading, tech_stack_lines,
    NEEDS_CONFIRMATION, NEEDS_INPUT, PROTOCOL_SECTIONS, RULES_SECTIONS, SPEC_SECTIONS,
};
use blueprint_core::rules::AGENT_RULES;
use blueprint_core::taxonomy::never_statement;
use blueprint_core::{ArtifactJob, ArtifactKind, BuildPhase, GenerationContext, Node};

/// System prompt and user message for one artifact call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// The line the response must start with.
    pub heading: String,
}

const VERBATIM: &str = "use these exact values, do not invent";

pub fn build_prompt(job: &ArtifactJob, ctx: &GenerationContext) -> Prompt {
    let heading = required_heading(job, ctx);
    Prompt {
        system: system_prompt(&heading),
        user: user_message(job, ctx, &heading),
        heading,
    }
}

/// Compact text form of the graph for model consumption.
pub fn serialize_graph(ctx: &GenerationContext) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str("NODES:\n");
    if ctx.nodes.is_empty() {
        out.push_str("(none)\n");
    }
    for node in &ctx.nodes {
        out.push('[');
        out.push_str(node.component_type.as_str());
        out.push_str("] ");
        out.push_str(&node.id);
        out.push_str(" \"");
        out.push_str(node.label.trim());
        out.push('"');
        if !node.tech_stack_labels.is_empty() {
            out.push_str(" tech=");
            out.push_str(&node.tech_stack_labels.join(","));
        }
        if let Some(lang) = ctx.language_of(&node.id) {
            out.push_str(" lang=");
            out.push_str(lang.label());
        }
        if let Some(d) = node.description_text() {
            out.push_str(" | \"");
            out.push_str(&d.replace('\n', " "));
            out.push('"');
        }
        out.push('\n');
    }

    out.push_str("EDGES:\n");
    if ctx.integration_rows.is_empty() {
        out.push_str("(none)\n");
    }
    for row in &ctx.integration_rows {
        out.push_str(&row.source_id);
        out.push_str(" \"");
        out.push_str(&row.source_label);
        out.push_str("\" --[");
        out.push_str(row.note.as_deref().unwrap_or("uses"));
        out.push_str("]--> ");
        out.push_str(&row.target_id);
        out.push_str(" \"");
        out.push_str(&row.target_label);
        out.push_str("\" pattern=");
        out.push_str(row.pattern);
        out.push('\n');
    }
    out
}

pub fn system_prompt(heading: &str) -> String {
    format!(
        "You write implementation documentation that coding agents follow to build a software project \
from an architecture sketch. Write clear, specific Markdown for the one document requested.\n\n\
Ground rules:\n\
- Every fact you are given under a heading marked \"{VERBATIM}\" must appear exactly as given: \
component names, build order, integration patterns, package names and versions\n\
- Never invent package names, versions, endpoints or vendors. Where information is missing write \
[{NEEDS_INPUT}: <what is missing>]; where a technology has no verified package write \
[{NEEDS_CONFIRMATION}: <what to confirm>]\n\
- Keep the required section headings in the given order and do not add top-level sections\n\
- Expand the prose of each section with concrete, actionable guidance for the listed components only\n\n\
Output ONLY the document. No commentary before or after it, no code fences around it. \
The first line of your response must be exactly:\n{heading}"
    )
}

fn push_list<S: AsRef<str>>(out: &mut String, items: &[S]) {
    for item in items {
        out.push_str("- ");
        out.push_str(item.as_ref());
        out.push('\n');
    }
}

fn build_order(out: &mut String, ctx: &GenerationContext) {
    out.push_str(&format!("BUILD ORDER ({VERBATIM}):\n"));
    for phase in BuildPhase::ALL {
        out.push_str(&format!("Phase {}: {}\n", phase.number(), phase.title()));
        let mut any = false;
        for node in ctx.phase_nodes(phase) {
            any = true;
            out.push_str(&format!(
                "- {} ({}) -> {}\n",
                node.label.trim(),
                node.component_type,
                ctx.file_name(node)
            ));
        }
        if !any {
            out.push_str("- (no components in this phase)\n");
        }
    }
    out.push('\n');
}

fn integrations(out: &mut String, ctx: &GenerationContext) {
    out.push_str(&format!("INTEGRATIONS ({VERBATIM}):\n"));
    if ctx.integration_rows.is_empty() {
        out.push_str("No integrations defined.\n\n");
    } else {
        out.push_str(&integration_table(ctx));
        out.push('\n');
    }
}

fn packages(out: &mut String, ctx: &GenerationContext, nodes: &[&Node]) {
    out.push_str(&format!("VERIFIED PACKAGES ({VERBATIM}):\n"));
    for node in nodes {
        out.push_str(&format!("{}:\n", node.label.trim()));
        for line in tech_stack_lines(node, ctx) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    if nodes.is_empty() {
        out.push_str("(no components)\n");
    }
    out.push('\n');
}

fn required_sections(out: &mut String, heading: &str, sections: &[String]) {
    out.push_str("REQUIRED STRUCTURE:\n");
    out.push_str(heading);
    out.push('\n');
    for s in sections {
        out.push_str(s);
        out.push('\n');
    }
}

pub fn user_message(job: &ArtifactJob, ctx: &GenerationContext, heading: &str) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(&format!("PROJECT: {}\n\n", heading_project(ctx)));
    out.push_str("ARCHITECTURE:\n");
    out.push_str(&serialize_graph(ctx));
    out.push('\n');

    match &job.kind {
        ArtifactKind::Rules => {
            out.push_str(&format!(
                "TASK: Write the project rules file `{}` shared by every coding agent on this project.\n\n",
                job.name
            ));
            out.push_str(&format!("ARCHITECTURE CONSTRAINTS ({VERBATIM}):\n"));
            push_list(&mut out, &constraints(ctx));
            out.push('\n');
            let languages = ctx.languages();
            if languages.is_empty() {
                out.push_str(&format!(
                    "CODE STANDARDS: no language detected; mark the section with [{NEEDS_CONFIRMATION}: implementation language].\n\n"
                ));
            } else {
                out.push_str(&format!("CODE STANDARDS ({VERBATIM}):\n"));
                for lang in languages {
                    out.push_str(&format!("{}:\n", lang.label()));
                    push_list(&mut out, &language_standards(lang));
                }
                out.push('\n');
            }
            build_order(&mut out, ctx);
            integrations(&mut out, ctx);
            let all: Vec<&Node> = ctx.nodes.iter().collect();
            packages(&mut out, ctx, &all);
            let sections: Vec<String> = RULES_SECTIONS.iter().map(|s| s.to_string()).collect();
            required_sections(&mut out, heading, &sections);
        }
        ArtifactKind::Protocol => {
            out.push_str(&format!(
                "TASK: Write the agent protocol file `{}`: how a coding agent reads the docs, \
works through the build sequence one component at a time, handles markers, and decides it is done.\n\n",
                job.name
            ));
            out.push_str(&format!("WORKING RULES ({VERBATIM}):\n{AGENT_RULES}\n\n"));
            build_order(&mut out, ctx);
            let unresolved = ctx.unresolved_labels();
            if !unresolved.is_empty() {
                out.push_str("UNVERIFIED TECHNOLOGY (list as open items):\n");
                for (node, tech) in unresolved {
                    out.push_str(&format!("- {tech} (used by {node})\n"));
                }
                out.push('\n');
            }
            let sections: Vec<String> = PROTOCOL_SECTIONS.iter().map(|s| s.to_string()).collect();
            required_sections(&mut out, heading, &sections);
        }
        ArtifactKind::Component(id) => match ctx.node(id) {
            Some(node) => component_message(&mut out, job, node, ctx, heading),
            None => {
                out.push_str(&format!(
                    "TASK: Component `{id}` is not part of this graph. Write only the heading and \
[{NEEDS_INPUT}: component `{id}` is not part of this graph].\n\n"
                ));
                required_sections(&mut out, heading, &[]);
            }
        },
    }
    out
}

fn component_message(out: &mut String, job: &ArtifactJob, node: &Node, ctx: &GenerationContext, heading: &str) {
    let profile = node.component_type.profile();
    let phase = BuildPhase::of(node.component_type);
    out.push_str(&format!(
        "TASK: Write the component spec `{}` for {} (id `{}`, type {}, build phase {} {}).\n\n",
        job.name,
        node.label.trim(),
        node.id,
        node.component_type,
        phase.number(),
        phase.title()
    ));
    match node.description_text() {
        Some(d) => out.push_str(&format!("DESCRIPTION: {d}\n\n")),
        None => out.push_str(&format!(
            "DESCRIPTION: none given; write [{NEEDS_INPUT}: what {} does] and suggest the default role: {}\n\n",
            node.label.trim(),
            profile.description
        )),
    }

    out.push_str(&format!("RESPONSIBILITIES ({VERBATIM}, you may add up to two more):\n"));
    push_list(out, profile.responsibilities);
    out.push('\n');

    out.push_str(&format!("ANTI-RESPONSIBILITIES ({VERBATIM}):\n"));
    let never: Vec<String> = profile.never.iter().map(|(rule, reason)| never_statement(rule, reason)).collect();
    push_list(out, &never);
    out.push('\n');

    let (outbound, inbound) = ctx.connections_of(&node.id);
    out.push_str(&format!("CONNECTIONS ({VERBATIM}):\n"));
    if outbound.is_empty() && inbound.is_empty() {
        out.push_str("No connections defined.\n");
    }
    for r in outbound {
        out.push_str(&format!("- outbound to {} via {}\n", r.target_label, r.pattern));
    }
    for r in inbound {
        out.push_str(&format!("- inbound from {} via {}\n", r.source_label, r.pattern));
    }
    out.push('\n');

    if let Some(lang) = ctx.language_for(node) {
        out.push_str(&format!("LANGUAGE: {}\n\n", lang.label()));
    }
    packages(out, ctx, &[node]);

    let mut sections: Vec<String> = SPEC_SECTIONS[..4].iter().map(|s| s.to_string()).collect();
    sections.extend(profile.spec_fields.iter().map(|f| format!("## {f}")));
    sections.push(SPEC_SECTIONS[4].to_string());
    required_sections(out, heading, &sections);
}

fn heading_project(ctx: &GenerationContext) -> &str {
    if ctx.project_name.is_empty() {
        "(unnamed)"
    } else {
        &ctx.project_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::{plan_artifacts, ComponentType, Edge};

    fn shop() -> GenerationContext {
        let nodes = vec![
            Node::new("api", ComponentType::Backend, "API").with_tech(["Express"]),
            Node::new("db", ComponentType::Storage, "Postgres DB").with_tech(["PostgreSQL"]),
        ];
        let edges = vec![Edge::new("e1", "api", "db").with_label("queries")];
        GenerationContext::build("Shop", &nodes, &edges)
    }

    #[test]
    fn system_prompt_requires_heading_first() {
        let s = system_prompt("# Shop Project Rules");
        assert!(s.ends_with("must be exactly:\n# Shop Project Rules"));
        assert!(s.contains("no code fences"));
    }

    #[test]
    fn rules_prompt_embeds_facts_verbatim() {
        let ctx = shop();
        let jobs = plan_artifacts(&ctx.nodes);
        let p = build_prompt(&jobs[0], &ctx);
        assert_eq!(p.heading, "# Shop Project Rules");
        assert!(p.user.contains("| API | Postgres DB | ORM/query access | queries |"));
        assert!(p.user.contains("`express@^4.21.2` (npm)"));
        assert!(p.user.contains("Phase 1: Foundation\n- Postgres DB (storage) -> specs/postgres-db.md"));
        for section in RULES_SECTIONS {
            assert!(p.user.contains(section), "{section}");
        }
    }

    #[test]
    fn protocol_prompt_carries_working_rules() {
        let ctx = shop();
        let jobs = plan_artifacts(&ctx.nodes);
        let p = build_prompt(&jobs[1], &ctx);
        assert!(p.user.contains(AGENT_RULES));
        assert!(p.user.contains(PROTOCOL_SECTIONS[4]));
    }

    #[test]
    fn component_prompt_lists_type_sections_in_order() {
        let ctx = shop();
        let jobs = plan_artifacts(&ctx.nodes);
        let p = build_prompt(&jobs[3], &ctx);
        assert_eq!(p.heading, "# Postgres DB Component Spec");
        let schema = p.user.find("## Schema").unwrap();
        let backup = p.user.find("## Backup & Recovery").unwrap();
        let tech = p.user.find("## Tech Stack").unwrap();
        assert!(schema < backup && backup < tech);
        assert!(p.user.contains("- inbound from API via ORM/query access"));
    }

    #[test]
    fn build_order_uses_replaced_file_names() {
        let ctx = shop().with_file_names([("db".to_string(), "specs/postgres-db-db.md".to_string())]);
        let p = build_prompt(&ctx.artifact_plan()[0], &ctx);
        assert!(p.user.contains("- Postgres DB (storage) -> specs/postgres-db-db.md\n"));
        assert!(!p.user.contains("specs/postgres-db.md"));
    }

    #[test]
    fn graph_serialization_is_compact() {
        let text = serialize_graph(&shop());
        assert!(text.contains("[backend] api \"API\" tech=Express lang=JavaScript\n"));
        assert!(text.contains("api \"API\" --[queries]--> db \"Postgres DB\" pattern=ORM/query access\n"));
    }
}
