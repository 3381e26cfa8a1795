//! Project rules file.

use crate::inference::{BuildPhase, GenerationContext};
use crate::registry::Language;
use crate::ComponentType;

use super::{cell, needs_confirmation, needs_input, push_bullets, rules_heading};

pub const RULES_SECTIONS: [&str; 6] = [
    "## 1. System Overview",
    "## 2. Component Registry",
    "## 3. Architecture Constraints",
    "## 4. Code Standards",
    "## 5. Build Order",
    "## 6. Integration Rules",
];

const BASELINE_CONSTRAINTS: &[&str] = &[
    "ALWAYS keep each component within the responsibilities listed in its spec",
    "ALWAYS load configuration and secrets from the environment",
    "NEVER add a dependency that is not listed in a component's Tech Stack block without asking first",
    "NEVER connect two components except through a pattern listed in Integration Rules",
    "PREFER small, single-purpose modules over large multi-purpose files",
    "PREFER explicit error handling over silent fallbacks",
];

/// Guidance used when no implementation language can be detected.
pub const CODE_STANDARDS_FALLBACK: &[&str] = &[
    "Naming: follow the idiomatic naming convention of the chosen language consistently",
    "Modularity: one concern per module; keep component boundaries visible in the directory layout",
    "Layout: one top-level directory per component listed in the Component Registry",
];

pub(super) fn render(ctx: &GenerationContext) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(&rules_heading(&ctx.project_name));
    out.push_str("\n\n");
    out.push_str(
        "> Project-wide rules for coding agents. Generated from the architecture sketch; \
         component details live in the files listed under Component Registry.\n\n",
    );

    system_overview(&mut out, ctx);
    component_registry(&mut out, ctx);
    architecture_constraints(&mut out, ctx);
    code_standards(&mut out, ctx);
    build_order(&mut out, ctx);
    integration_rules(&mut out, ctx);
    out
}

fn system_overview(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[0]);
    out.push_str("\n\n");

    let stack = ctx.stack_labels();
    out.push_str("**Stack:** ");
    if stack.is_empty() {
        out.push_str(&needs_input("no technologies selected for any component"));
    } else {
        out.push_str(&stack.join(", "));
    }
    out.push_str("\n\n");

    out.push_str(&format!(
        "**Components:** {} across {} connection(s)\n\n",
        ctx.nodes.len(),
        ctx.edges.len()
    ));

    out.push_str("**Boundaries:**\n\n");
    let present = ctx.present_types();
    let boundaries: Vec<&str> = ComponentType::ALL
        .iter()
        .map(|t| {
            let profile = t.profile();
            if present.contains(t) {
                profile.is_statement
            } else {
                profile.is_not_statement
            }
        })
        .collect();
    push_bullets(out, &boundaries);
    out.push('\n');
}

fn component_registry(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[1]);
    out.push_str("\n\n");
    if ctx.nodes.is_empty() {
        out.push_str("No components defined.\n\n");
        return;
    }
    out.push_str("| ID | Component | Type | Spec | Status |\n");
    out.push_str("|---|---|---|---|---|\n");
    for node in &ctx.nodes {
        out.push_str(&format!(
            "| {} | {} | {} | {} | not-started |\n",
            cell(&node.id),
            cell(&node.label),
            node.component_type,
            ctx.file_name(node),
        ));
    }
    out.push('\n');
}

/// Baseline bullets plus up to two security bullets per present type, first
/// occurrence wins.
pub fn constraints(ctx: &GenerationContext) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    let type_bullets = ctx
        .present_types()
        .into_iter()
        .flat_map(|t| t.profile().security.iter().take(2));
    for &bullet in BASELINE_CONSTRAINTS.iter().chain(type_bullets) {
        if !out.contains(&bullet) {
            out.push(bullet);
        }
    }
    out
}

fn architecture_constraints(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[2]);
    out.push_str("\n\n");
    push_bullets(out, &constraints(ctx));
    out.push('\n');
}

pub fn language_standards(lang: Language) -> [&'static str; 3] {
    match lang {
        Language::TypeScript => [
            "Naming: camelCase for variables and functions, PascalCase for types, classes and UI components",
            "Modularity: one exported concern per module; `strict` mode enabled in tsconfig; no `any` in public signatures",
            "Layout: source under `src/`, tests beside the code as `*.test.ts`",
        ],
        Language::JavaScript => [
            "Naming: camelCase for variables and functions, PascalCase for classes and UI components",
            "Modularity: ES modules with one exported concern per file; lint with ESLint",
            "Layout: source under `src/`, tests beside the code as `*.test.js`",
        ],
        Language::Python => [
            "Naming: snake_case for functions and modules, PascalCase for classes, UPPER_CASE for constants",
            "Modularity: one concern per module; type hints on every public function; PEP 8 formatting",
            "Layout: package under `src/<package>/`, tests under `tests/` run with pytest",
        ],
        Language::Go => [
            "Naming: MixedCaps, exported identifiers capitalized, short lowercase package names",
            "Modularity: small packages with narrow interfaces; errors returned, never panicked; gofmt enforced",
            "Layout: binaries under `cmd/`, private packages under `internal/`, table-driven tests in `_test.go` files",
        ],
        Language::Rust => [
            "Naming: snake_case for functions and modules, CamelCase for types and traits",
            "Modularity: one concern per module; errors propagated with `Result` and `?`; cargo fmt and clippy clean",
            "Layout: library code under `src/`, unit tests in `#[cfg(test)]` modules, integration tests under `tests/`",
        ],
        Language::Java => [
            "Naming: camelCase for methods and fields, PascalCase for classes, UPPER_SNAKE_CASE for constants",
            "Modularity: package by feature; constructor injection; no static mutable state",
            "Layout: standard Maven/Gradle layout with `src/main/java` and `src/test/java`",
        ],
    }
}

fn code_standards(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[3]);
    out.push_str("\n\n");
    let languages = ctx.languages();
    if languages.is_empty() {
        out.push_str(&needs_confirmation(
            "no implementation language could be detected from the tech stack; confirm the language before writing code",
        ));
        out.push_str("\n\n");
        push_bullets(out, CODE_STANDARDS_FALLBACK);
        out.push('\n');
        return;
    }
    for lang in languages {
        out.push_str(&format!("### {}\n\n", lang.label()));
        push_bullets(out, &language_standards(lang));
        out.push('\n');
    }
}

fn build_order(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[4]);
    out.push_str("\n\n");
    for phase in BuildPhase::ALL {
        out.push_str(&format!(
            "### Phase {}: {}\n\n_{}_\n\n",
            phase.number(),
            phase.title(),
            phase.summary()
        ));
        let mut any = false;
        for node in ctx.phase_nodes(phase) {
            any = true;
            out.push_str(&format!(
                "- [ ] {} ({}) → `{}`\n",
                node.label.trim(),
                node.component_type,
                ctx.file_name(node)
            ));
        }
        if !any {
            out.push_str("_No components in this phase._\n");
        }
        out.push('\n');
    }
}

fn integration_rules(out: &mut String, ctx: &GenerationContext) {
    out.push_str(RULES_SECTIONS[5]);
    out.push_str("\n\n");
    if ctx.integration_rows.is_empty() {
        out.push_str("No integrations defined.\n");
        return;
    }
    out.push_str(&integration_table(ctx));
}

/// The integration table on its own; shared with the model prompts.
pub fn integration_table(ctx: &GenerationContext) -> String {
    let mut out = String::from("| From | To | Pattern | Notes |\n|---|---|---|---|\n");
    for row in &ctx.integration_rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&row.source_label),
            cell(&row.target_label),
            row.pattern,
            cell(row.note.as_deref().unwrap_or("")),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    fn ctx(nodes: &[Node], edges: &[Edge]) -> GenerationContext {
        GenerationContext::build("Shop", nodes, edges)
    }

    #[test]
    fn constraints_are_deduplicated() {
        let nodes = vec![
            Node::new("e", ComponentType::External, "Stripe"),
            Node::new("w", ComponentType::Background, "Worker"),
        ];
        let bullets = constraints(&ctx(&nodes, &[]));
        let timeouts = bullets
            .iter()
            .filter(|b| b.contains("explicit timeouts"))
            .count();
        assert_eq!(timeouts, 1);
        assert_eq!(bullets.len(), BASELINE_CONSTRAINTS.len() + 3);
    }

    #[test]
    fn constraints_for_empty_graph_are_baseline() {
        assert_eq!(constraints(&ctx(&[], &[])), BASELINE_CONSTRAINTS.to_vec());
    }

    #[test]
    fn every_section_renders_for_empty_graph() {
        let doc = render(&ctx(&[], &[]));
        for section in RULES_SECTIONS {
            assert!(doc.contains(section), "{section}");
        }
        assert!(doc.contains("No components defined."));
        assert!(doc.contains("No integrations defined."));
        assert!(doc.contains("_No components in this phase._"));
        assert!(doc.contains("[NEEDS INPUT: no technologies selected"));
        assert!(doc.contains("[NEEDS CONFIRMATION: no implementation language"));
    }

    #[test]
    fn boundaries_reflect_present_types() {
        let doc = render(&ctx(&[Node::new("b", ComponentType::Backend, "API")], &[]));
        assert!(doc.contains(ComponentType::Backend.profile().is_statement));
        assert!(doc.contains(ComponentType::Frontend.profile().is_not_statement));
    }

    #[test]
    fn code_standards_follow_detected_languages() {
        let nodes = vec![
            Node::new("a", ComponentType::Backend, "API").with_tech(["FastAPI"]),
            Node::new("w", ComponentType::Background, "Worker").with_tech(["Go"]),
        ];
        let doc = render(&ctx(&nodes, &[]));
        let py = doc.find("### Python").unwrap();
        let go = doc.find("### Go").unwrap();
        assert!(py < go);
        assert!(!doc.contains("no implementation language"));
    }

    #[test]
    fn table_cells_escape_pipes() {
        let nodes = vec![
            Node::new("a", ComponentType::Frontend, "Web|App"),
            Node::new("b", ComponentType::Backend, "API"),
        ];
        let edges = vec![Edge::new("e", "a", "b")];
        let table = integration_table(&ctx(&nodes, &edges));
        assert!(table.contains("| Web\\|App | API | HTTP/REST API | - |"));
    }
}
