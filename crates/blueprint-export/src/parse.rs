/// Turn raw model output into a document that starts with `heading`.
///
/// Strips a code fence wrapping the document and any preamble before the
/// first H1. A differing H1 is replaced by `heading`; a missing one is added.
/// Lines inside code blocks never count as headings.
/// Returns `None` when nothing but the heading would remain.
pub fn clean_response(raw: &str, heading: &str) -> Option<String> {
    let text = unwrap_document(raw.trim());

    let start = find_heading(text, |line| line.trim_end() == heading)
        .or_else(|| find_heading(text, |line| line.starts_with("# ")));

    let body = match start {
        Some(i) => {
            let doc = &text[i..];
            // Drop the heading line itself; it is re-added below.
            match doc.split_once('\n') {
                Some((_, rest)) => rest,
                None => "",
            }
        }
        None => text,
    };

    let body = strip_closing_fence(body).trim();
    if body.is_empty() {
        return None;
    }
    Some(format!("{heading}\n\n{body}\n"))
}

/// Offset of the first line outside code blocks that satisfies `pred`.
fn find_heading(text: &str, pred: impl Fn(&str) -> bool) -> Option<usize> {
    let mut offset = 0;
    let mut in_code = false;
    for line in text.split_inclusive('\n') {
        let line_text = line.trim_end_matches(['\n', '\r']);
        if is_fence(line_text) {
            in_code = !in_code;
        } else if !in_code && pred(line_text) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// A plain or markdown fence opened before any heading wraps the whole
/// document. Returns the text after it; the closing fence is left for
/// [`strip_closing_fence`].
fn unwrap_document(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let line_text = line.trim();
        if line_text.starts_with('#') {
            return text;
        }
        if is_fence(line_text) {
            let info = line_text.trim_start_matches('`').trim();
            return match info {
                "" | "markdown" | "md" => &text[offset + line.len()..],
                _ => text,
            };
        }
        offset += line.len();
    }
    text
}

/// Remove a trailing fence line left over from a fenced response. Fences that
/// belong to code blocks inside the document come in pairs and are kept.
fn strip_closing_fence(body: &str) -> &str {
    let body = body.trim_end();
    let fences = body.lines().filter(|l| is_fence(l)).count();
    if fences % 2 == 0 {
        return body;
    }
    match body.rsplit_once('\n') {
        Some((rest, last)) if is_fence(last) => rest,
        None if is_fence(body) => "",
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: &str = "# Shop Project Rules";

    #[test]
    fn clean_output_is_kept() {
        let raw = "# Shop Project Rules\n\n## 1. System Overview\n\nText.";
        assert_eq!(
            clean_response(raw, H).unwrap(),
            "# Shop Project Rules\n\n## 1. System Overview\n\nText.\n"
        );
    }

    #[test]
    fn preamble_and_fences_are_stripped() {
        let raw = "Sure! Here is the document:\n\n```markdown\n# Shop Project Rules\n\n## 1. System Overview\nBody\n```\n";
        assert_eq!(
            clean_response(raw, H).unwrap(),
            "# Shop Project Rules\n\n## 1. System Overview\nBody\n"
        );
    }

    #[test]
    fn inner_code_blocks_survive() {
        let raw = "# Shop Project Rules\n\n```sh\nnpm install\n```\n";
        let cleaned = clean_response(raw, H).unwrap();
        assert!(cleaned.ends_with("```sh\nnpm install\n```\n"));
    }

    #[test]
    fn wrong_heading_is_replaced() {
        let raw = "# Rules for Shop\n\nBody";
        assert_eq!(clean_response(raw, H).unwrap(), "# Shop Project Rules\n\nBody\n");
    }

    #[test]
    fn missing_heading_is_added() {
        let raw = "```\n## 1. System Overview\nBody\n```";
        assert_eq!(
            clean_response(raw, H).unwrap(),
            "# Shop Project Rules\n\n## 1. System Overview\nBody\n"
        );
    }

    #[test]
    fn shell_comment_is_not_a_heading() {
        let raw = "## 1. System Overview\nImportant overview text.\n\n```sh\n# install deps\nnpm i\n```\n";
        assert_eq!(
            clean_response(raw, H).unwrap(),
            "# Shop Project Rules\n\n## 1. System Overview\nImportant overview text.\n\n```sh\n# install deps\nnpm i\n```\n"
        );
    }

    #[test]
    fn wrapped_document_keeps_inner_code_blocks() {
        let raw = "Here it is:\n```markdown\n# Shop Project Rules\n\n```sh\n# seed\nnpm run seed\n```\n```";
        assert_eq!(
            clean_response(raw, H).unwrap(),
            "# Shop Project Rules\n\n```sh\n# seed\nnpm run seed\n```\n"
        );
    }

    #[test]
    fn empty_output_is_rejected() {
        assert_eq!(clean_response("", H), None);
        assert_eq!(clean_response("  \n\t", H), None);
        assert_eq!(clean_response("# Shop Project Rules\n", H), None);
        assert_eq!(clean_response("```\n```", H), None);
    }
}
