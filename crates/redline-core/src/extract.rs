//! Final-text extraction.
//!
//! Accepting every tracked change means keeping additions and dropping
//! deletions. The backend's own struck markup is dropped the same way, and
//! every other element passes its text through, so malformed or unexpected
//! markup never stops extraction.

use crate::html::parse_markup;
use crate::markup::{MarkupKind, Node, SpanClasses};

/// Accepted plain text of `nodes`, in reading order.
pub fn extract_final_text(nodes: &[Node], classes: &SpanClasses) -> String {
    let mut out = String::new();
    push_final_text(nodes, classes, &mut out);
    out
}

/// Parse `markup` and extract its final text.
pub fn final_text_from_markup(markup: &str, classes: &SpanClasses) -> String {
    extract_final_text(&parse_markup(markup), classes)
}

fn push_final_text(nodes: &[Node], classes: &SpanClasses, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Element(el) => match classes.classify(el) {
                MarkupKind::Deletion | MarkupKind::Struck => {}
                MarkupKind::LineBreak => out.push('\n'),
                MarkupKind::Addition | MarkupKind::Other => {
                    push_final_text(&el.children, classes, out)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::markup_from_plain_text;

    fn final_text(markup: &str) -> String {
        final_text_from_markup(markup, &SpanClasses::default())
    }

    #[test]
    fn test_keeps_additions_drops_deletions() {
        assert_eq!(
            final_text(
                "Payment is due within <span class=\"tc-del\">30</span><span class=\"tc-ins\">45</span> days."
            ),
            "Payment is due within 45 days."
        );
    }

    #[test]
    fn test_backend_diff_markup() {
        assert_eq!(
            final_text("a <del class=\"diff-del\">old</del><ins class=\"diff-ins\">new</ins> b"),
            "a new b"
        );
        assert_eq!(final_text("x<s>y</s><strike>z</strike>"), "x");
    }

    #[test]
    fn test_line_breaks_and_entities() {
        assert_eq!(final_text("one<br>two &amp; three"), "one\ntwo & three");
    }

    #[test]
    fn test_unknown_markup_passes_through() {
        assert_eq!(
            final_text("<p>para <b>bold <span class=\"tc-del\">gone</span></b></p><x-y>z"),
            "para bold z"
        );
    }

    #[test]
    fn test_extraction_is_a_fixed_point() {
        let once = final_text(
            "The <span class=\"tc-del\">cat </span>sat<span class=\"tc-ins\">\non &amp; &lt;mat&gt;</span>",
        );
        assert_eq!(once, "The sat\non & <mat>");
        let reseeded = markup_from_plain_text(&once);
        assert_eq!(final_text(&reseeded), once);
    }
}
