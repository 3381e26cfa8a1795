//! Agent workflow protocol file.

use crate::artifact::RULES_FILE;
use crate::inference::{BuildPhase, GenerationContext};
use crate::rules::AGENT_RULES;

use super::{needs_confirmation, needs_input, protocol_heading, push_bullets, NEEDS_CONFIRMATION, NEEDS_INPUT};

pub const PROTOCOL_SECTIONS: [&str; 5] = [
    "## 1. Read First",
    "## 2. Working Rules",
    "## 3. Build Sequence",
    "## 4. Open Items",
    "## 5. Definition of Done",
];

const DONE_CHECKLIST: &[&str] = &[
    "- [ ] Every responsibility in the component spec is implemented",
    "- [ ] No anti-responsibility is violated",
    "- [ ] Only packages from the Tech Stack block were added, at the listed versions",
    "- [ ] Integrations use the pattern from the Integration Rules table",
    "- [ ] Tests for the component pass and the project builds",
    "- [ ] The component's status in the registry is updated",
];

pub(super) fn render(ctx: &GenerationContext) -> String {
    let mut out = String::with_capacity(3072);
    out.push_str(&protocol_heading(&ctx.project_name));
    out.push_str("\n\n");
    out.push_str("> How a coding agent works through this project. Follow it on every session.\n\n");

    out.push_str(PROTOCOL_SECTIONS[0]);
    out.push_str("\n\n");
    out.push_str(&format!("- `{RULES_FILE}`: stack, boundaries, constraints, build order and integrations\n"));
    if ctx.nodes.is_empty() {
        out.push_str("- No component specs yet: the architecture sketch has no components.\n");
    } else {
        for node in &ctx.nodes {
            out.push_str(&format!("- `{}`: {}\n", ctx.file_name(node), node.label.trim()));
        }
    }
    out.push('\n');

    out.push_str(PROTOCOL_SECTIONS[1]);
    out.push_str("\n\n");
    out.push_str(AGENT_RULES);
    out.push_str("\n\n");

    out.push_str(PROTOCOL_SECTIONS[2]);
    out.push_str("\n\n");
    build_sequence(&mut out, ctx);

    out.push_str(PROTOCOL_SECTIONS[3]);
    out.push_str("\n\n");
    open_items(&mut out, ctx);

    out.push_str(PROTOCOL_SECTIONS[4]);
    out.push_str("\n\nA component is done when:\n\n");
    for item in DONE_CHECKLIST {
        out.push_str(item);
        out.push('\n');
    }
    out
}

fn build_sequence(out: &mut String, ctx: &GenerationContext) {
    let mut step = 0;
    for phase in BuildPhase::ALL {
        for node in ctx.phase_nodes(phase) {
            step += 1;
            out.push_str(&format!(
                "{step}. {} ({}, phase {} {}) → `{}`\n",
                node.label.trim(),
                node.component_type,
                phase.number(),
                phase.title(),
                ctx.file_name(node)
            ));
        }
    }
    if step == 0 {
        out.push_str("No components defined. Add components to the architecture sketch before starting implementation.\n");
    }
    out.push('\n');
}

fn open_items(out: &mut String, ctx: &GenerationContext) {
    out.push_str(&format!(
        "`[{NEEDS_INPUT}: ...]` marks information the sketch does not contain. \
         `[{NEEDS_CONFIRMATION}: ...]` marks a technology without a verified package. \
         Resolve both with the user before implementing the affected component.\n\n"
    ));

    let mut items: Vec<String> = ctx
        .unresolved_labels()
        .into_iter()
        .map(|(node, label)| {
            format!(
                "{}: {node} uses \"{label}\", which has no verified package",
                needs_confirmation("package and version")
            )
        })
        .collect();
    items.extend(
        ctx.nodes
            .iter()
            .filter(|n| n.description_text().is_none())
            .map(|n| format!("{}: {} has no description", needs_input("description"), n.label.trim())),
    );

    if items.is_empty() {
        out.push_str("No open items.\n\n");
    } else {
        push_bullets(out, &items);
        out.push('\n');
    }
}
