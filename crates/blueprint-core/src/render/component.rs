//! Per-component spec documents.

use crate::inference::{BuildPhase, GenerationContext, IntegrationRow};
use crate::registry::PackageCoordinate;
use crate::taxonomy::never_statement;
use crate::{ComponentType, Node};

use super::{component_heading, needs_confirmation, needs_input, push_bullets};

/// Fixed sections of every component spec. Type-specific sections sit
/// between Connections and Tech Stack.
pub const SPEC_SECTIONS: [&str; 5] = [
    "## Description",
    "## Responsibilities",
    "## Anti-Responsibilities",
    "## Connections",
    "## Tech Stack",
];

/// Auth technologies recognised for the Auth Strategy section.
const AUTH_TECH: &[&str] = &[
    "jwt",
    "oauth",
    "oauth 2.0",
    "oidc",
    "openid connect",
    "auth0",
    "clerk",
    "supabase auth",
    "firebase auth",
    "keycloak",
    "passport.js",
    "nextauth",
    "auth.js",
    "cognito",
];

/// A type-specific section of a component spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecField {
    pub title: &'static str,
    pub lines: Vec<String>,
}

fn field(title: &'static str, lines: Vec<String>) -> SpecField {
    SpecField { title, lines }
}

fn describe(row: &IntegrationRow, peer: &str) -> String {
    match &row.note {
        Some(note) => format!("{peer} via {} ({note})", row.pattern),
        None => format!("{peer} via {}", row.pattern),
    }
}

fn peers_of_type<'a>(
    rows: &[&'a IntegrationRow],
    ctx: &GenerationContext,
    outbound: bool,
    component_type: ComponentType,
) -> Vec<&'a IntegrationRow> {
    rows.iter()
        .copied()
        .filter(|r| {
            let peer = if outbound { &r.target_id } else { &r.source_id };
            ctx.node(peer).map(|n| n.component_type) == Some(component_type)
        })
        .collect()
}

/// Type-specific sections for `node`, derived from the graph where possible
/// and marked where not.
pub fn type_fields(node: &Node, ctx: &GenerationContext) -> Vec<SpecField> {
    let (outbound, inbound) = ctx.connections_of(&node.id);
    let label = node.label.trim();
    match node.component_type {
        ComponentType::Frontend => {
            let mut routing: Vec<String> = outbound
                .iter()
                .map(|r| format!("Data comes from {}", describe(r, &r.target_label)))
                .collect();
            routing.push(needs_input(&format!("routes and screens of {label}")));

            let backends = peers_of_type(&outbound, ctx, true, ComponentType::Backend);
            let mut state = Vec::new();
            if backends.is_empty() {
                state.push("No backend connection is defined; all state is client-side".to_string());
            } else {
                let names: Vec<&str> = backends.iter().map(|r| r.target_label.as_str()).collect();
                state.push(format!(
                    "Server state is owned by {}; cache it on the client, never duplicate it as a source of truth",
                    names.join(", ")
                ));
            }
            state.push(needs_input("client-side state management approach"));
            vec![field("Routing", routing), field("State Management", state)]
        }
        ComponentType::Backend => {
            let mut endpoints: Vec<String> = inbound
                .iter()
                .map(|r| format!("Serves {}", describe(r, &r.source_label)))
                .collect();
            if endpoints.is_empty() {
                endpoints.push("No inbound callers are defined in the sketch".to_string());
            }
            endpoints.push("Use one consistent error response shape across all endpoints".to_string());
            endpoints.push(needs_input(&format!("concrete routes, methods and payloads of {label}")));
            vec![field("Endpoint Patterns", endpoints)]
        }
        ComponentType::Storage => {
            let mut schema: Vec<String> = inbound
                .iter()
                .map(|r| format!("Accessed by {}", describe(r, &r.source_label)))
                .collect();
            if schema.is_empty() {
                schema.push("No component accesses this store yet".to_string());
            }
            schema.push(needs_input(&format!("entities, fields and relations stored in {label}")));
            let backup = vec![
                "Apply every schema change through versioned migrations".to_string(),
                needs_input("backup frequency, retention and restore target"),
            ];
            vec![field("Schema", schema), field("Backup & Recovery", backup)]
        }
        ComponentType::Auth => {
            let mut strategy: Vec<String> = node
                .tech_stack_labels
                .iter()
                .map(|l| l.trim())
                .filter(|l| AUTH_TECH.contains(&l.to_lowercase().as_str()))
                .map(|l| format!("Use {l} as selected in the architecture sketch"))
                .collect();
            if strategy.is_empty() {
                strategy.push(needs_input("session cookies, JWT or a hosted identity provider"));
            }
            strategy.extend(
                inbound
                    .iter()
                    .map(|r| format!("Consumed by {}", describe(r, &r.source_label))),
            );
            vec![field("Auth Strategy", strategy)]
        }
        ComponentType::External => {
            let mut limits: Vec<String> = inbound
                .iter()
                .map(|r| format!("Called by {}", describe(r, &r.source_label)))
                .collect();
            limits.push(needs_input(&format!("rate limits and quotas of {label}")));
            let errors = vec![
                "Set an explicit timeout on every call".to_string(),
                "Map provider errors to internal error types at the integration boundary".to_string(),
                "Surface outages to callers instead of retrying without bound".to_string(),
            ];
            vec![field("Rate Limits", limits), field("Error Handling", errors)]
        }
        ComponentType::Background => {
            let mut jobs: Vec<String> = inbound
                .iter()
                .map(|r| format!("Triggered by {}", describe(r, &r.source_label)))
                .collect();
            jobs.extend(
                outbound
                    .iter()
                    .map(|r| format!("Writes to {}", describe(r, &r.target_label))),
            );
            jobs.push(needs_input("job names, triggers and schedules"));
            let retry = vec![
                "Retry failed jobs with bounded exponential backoff".to_string(),
                "Move jobs that exhaust their retries to a dead-letter queue".to_string(),
                needs_input("maximum attempts per job"),
            ];
            vec![field("Job Definitions", jobs), field("Retry Policy", retry)]
        }
    }
}

fn package_line(p: &PackageCoordinate) -> String {
    let companion = if p.is_runtime_companion { " (runtime companion)" } else { "" };
    format!(
        "`{}` ({}){companion}: {}. Docs: {}",
        p.pinned(),
        p.registry_kind.as_str(),
        p.purpose,
        p.docs_url
    )
}

pub fn tech_stack_lines(node: &Node, ctx: &GenerationContext) -> Vec<String> {
    let resolutions = ctx.resolutions_for(node);
    if resolutions.is_empty() {
        return vec![needs_input("no technologies selected for this component")];
    }
    let mut lines = Vec::new();
    for r in resolutions.iter() {
        if r.is_resolved() {
            lines.push(format!("**{}**", r.label.trim()));
            for p in r.packages {
                lines.push(format!("  - {}", package_line(p)));
            }
        } else {
            lines.push(format!(
                "**{}** {}",
                r.label.trim(),
                needs_confirmation(&format!(
                    "no verified package for \"{}\"; confirm the package name and version before installing",
                    r.label.trim()
                ))
            ));
        }
    }
    lines
}

pub(super) fn render(node: &Node, ctx: &GenerationContext) -> String {
    let mut out = String::with_capacity(2048);
    let profile = node.component_type.profile();
    let phase = BuildPhase::of(node.component_type);

    out.push_str(&component_heading(node));
    out.push_str("\n\n");
    out.push_str(&format!(
        "**ID:** `{}` | **Type:** {} ({}) | **Build phase:** {} {}\n\n",
        node.id,
        profile.label,
        node.component_type,
        phase.number(),
        phase.title()
    ));

    out.push_str(SPEC_SECTIONS[0]);
    out.push_str("\n\n");
    match node.description_text() {
        Some(d) => out.push_str(d),
        None => out.push_str(&needs_input(&format!(
            "what {} does; default role: {}",
            node.label.trim(),
            profile.description
        ))),
    }
    out.push_str("\n\n");

    out.push_str(SPEC_SECTIONS[1]);
    out.push_str("\n\n");
    push_bullets(&mut out, profile.responsibilities);
    out.push('\n');

    out.push_str(SPEC_SECTIONS[2]);
    out.push_str("\n\n");
    let never: Vec<String> = profile
        .never
        .iter()
        .map(|(rule, reason)| never_statement(rule, reason))
        .collect();
    push_bullets(&mut out, &never);
    out.push('\n');

    out.push_str(SPEC_SECTIONS[3]);
    out.push_str("\n\n");
    let (outbound, inbound) = ctx.connections_of(&node.id);
    if outbound.is_empty() && inbound.is_empty() {
        out.push_str("No connections defined.\n\n");
    } else {
        if !outbound.is_empty() {
            out.push_str("### Outbound\n\n");
            let lines: Vec<String> = outbound.iter().map(|r| describe(r, &r.target_label)).collect();
            push_bullets(&mut out, &lines);
            out.push('\n');
        }
        if !inbound.is_empty() {
            out.push_str("### Inbound\n\n");
            let lines: Vec<String> = inbound.iter().map(|r| describe(r, &r.source_label)).collect();
            push_bullets(&mut out, &lines);
            out.push('\n');
        }
    }

    for f in type_fields(node, ctx) {
        out.push_str(&format!("## {}\n\n", f.title));
        push_bullets(&mut out, &f.lines);
        out.push('\n');
    }

    out.push_str(SPEC_SECTIONS[4]);
    out.push_str("\n\n");
    if let Some(lang) = ctx.language_for(node) {
        out.push_str(&format!("Language: {}\n\n", lang.label()));
    }
    push_bullets(&mut out, &tech_stack_lines(node, ctx));
    out
}
