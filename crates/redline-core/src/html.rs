//! Lenient HTML-subset parsing and deterministic serialization.
//!
//! Seed markup comes from the backend's inline-diff renderer or from a host
//! persisting a previous revision. Neither is trusted to be well formed, so
//! parsing never fails: unknown tags become generic elements, stray closing
//! tags are dropped, and unclosed elements are closed at end of input.

use std::fmt;

use markdown_weaver_escape::{FmtWriter, escape_html, escape_html_body_text};
use smol_str::SmolStr;

use crate::markup::{Element, Node};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "wbr", "input", "meta", "link"];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Parse markup into a list of top-level nodes.
pub fn parse_markup(input: &str) -> Vec<Node> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        stack: vec![Element::new("#root")],
    };
    parser.run();

    while parser.stack.len() > 1 {
        parser.close_top();
    }
    parser
        .stack
        .pop()
        .map(|root| root.children)
        .unwrap_or_default()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    stack: Vec<Element>,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if let Some(after) = rest.strip_prefix("<!--") {
                self.pos += 4 + after.find("-->").map(|i| i + 3).unwrap_or(after.len());
            } else if rest.starts_with("</") {
                self.closing_tag();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos += rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                if !self.opening_tag() {
                    self.push_text("<");
                    self.pos += 1;
                }
            } else {
                // Text runs up to the next '<' that is not the current char.
                let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                let end = rest[first..]
                    .find('<')
                    .map(|i| i + first)
                    .unwrap_or(rest.len());
                let raw = &rest[..end];
                let decoded = decode_entities(raw);
                self.pos += end;
                self.push_text(&decoded);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if let Some(Node::Text(prev)) = top.children.last_mut() {
            prev.push_str(text);
        } else {
            top.children.push(Node::Text(text.to_string()));
        }
    }

    fn close_top(&mut self) {
        if let Some(el) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(Node::Element(el));
            }
        }
    }

    fn closing_tag(&mut self) {
        let rest = self.rest();
        let Some(end) = rest.find('>') else {
            // Unterminated: keep it as text.
            let text = rest.to_string();
            self.pos = self.src.len();
            self.push_text(&text);
            return;
        };
        let name = rest[2..end].trim().to_ascii_lowercase();
        self.pos += end + 1;

        let open_idx = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, el)| el.tag == name.as_str())
            .map(|(i, _)| i);
        if let Some(idx) = open_idx {
            while self.stack.len() > idx {
                self.close_top();
            }
        } else {
            tracing::trace!(target: "redline::markup", tag = %name, "ignoring stray closing tag");
        }
    }

    /// Parse `<tag attr="v" ...>`. Returns false when the tag is unterminated.
    fn opening_tag(&mut self) -> bool {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let tag = SmolStr::new(rest[1..i].to_ascii_lowercase());
        let mut el = Element::new(tag);
        let mut self_closing = false;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return false;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let name_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let name = SmolStr::new(rest[name_start..i].to_ascii_lowercase());
            let mut value = String::new();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    let value_start = i + 1;
                    let Some(len) = bytes[value_start..].iter().position(|b| *b == quote) else {
                        return false;
                    };
                    value = decode_entities(&rest[value_start..value_start + len]);
                    i = value_start + len + 1;
                } else {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_entities(&rest[value_start..i]);
                }
            }
            if !name.is_empty() {
                self_closing = false;
                el.attrs.push((name, value));
            }
        }

        self.pos += i;
        let Some(top) = self.stack.last_mut() else {
            return true;
        };
        if self_closing || el.is_void() {
            top.children.push(Node::Element(el));
        } else {
            self.stack.push(el);
        }
        true
    }
}

/// Decode the entities the backend and browsers emit. Unknown entities are
/// kept literally.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let num = name.strip_prefix('#')?;
                    let hex = num.strip_prefix('x').or_else(|| num.strip_prefix('X'));
                    let code = match hex {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => num.parse().ok()?,
                    };
                    char::from_u32(code)
                }
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text content: `&`, `<` and `>`.
pub fn escape_text(text: &str, out: &mut String) -> fmt::Result {
    escape_html_body_text(FmtWriter(out), text)
}

pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = nodes
        .iter()
        .try_for_each(|node| serialize_node(node, &mut out));
    out
}

fn serialize_node(node: &Node, out: &mut String) -> fmt::Result {
    match node {
        Node::Text(s) => escape_text(s, out),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_html(FmtWriter(&mut *out), value)?;
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return Ok(());
            }
            for child in &el.children {
                serialize_node(child, out)?;
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
            Ok(())
        }
    }
}

/// Seed markup for plain text: escaped, with newlines as `<br>`.
pub fn markup_from_plain_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let normalized = text.replace("\r\n", "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        let _ = escape_text(line, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diff_markup() {
        let nodes = parse_markup(
            "Pay <del class=\"diff-del\">30</del><ins class=\"diff-ins\">45</ins> days",
        );
        assert_eq!(nodes.len(), 4);
        let del = nodes[1].as_element().unwrap();
        assert_eq!(del.tag, "del");
        assert!(del.has_class("diff-del"));
        assert_eq!(del.text_content(), "30");
        assert_eq!(nodes[3], Node::text(" days"));
    }

    #[test]
    fn test_entities_decode_and_escape() {
        let nodes = parse_markup("a &amp; b &lt;c&gt; &#39;d&#x27; &bogus; &nbsp;");
        assert_eq!(nodes, vec![Node::text("a & b <c> 'd' &bogus; \u{a0}")]);
        assert_eq!(
            serialize_nodes(&nodes),
            "a &amp; b &lt;c&gt; 'd' &amp;bogus; \u{a0}"
        );
    }

    #[test]
    fn test_attribute_quotes_escaped() {
        let nodes = parse_markup("<span title='say \"hi\" & go'>\"x\"</span>");
        assert_eq!(
            serialize_nodes(&nodes),
            "<span title=\"say &quot;hi&quot; &amp; go\">\"x\"</span>"
        );
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let nodes = parse_markup("a</b>c<span class=\"x\">d<i>e");
        assert_eq!(serialize_nodes(&nodes), "ac<span class=\"x\">d<i>e</i></span>");

        let nodes = parse_markup("1 < 2 and <3");
        assert_eq!(nodes, vec![Node::text("1 < 2 and <3")]);

        let nodes = parse_markup("x<span class=\"oops");
        assert_eq!(nodes, vec![Node::text("x<span class=\"oops")]);
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_markup("a<br>b<br/>c<span/>d");
        assert_eq!(serialize_nodes(&nodes), "a<br>b<br>c<span></span>d");
    }

    #[test]
    fn test_comments_dropped() {
        let nodes = parse_markup("a<!-- note -->b");
        assert_eq!(nodes, vec![Node::text("ab")]);
    }

    #[test]
    fn test_serialize_is_fixed_point() {
        let src = "<P CLASS='x' data-id=3>One &amp; <B>two</p> <br> three";
        let once = serialize_nodes(&parse_markup(src));
        let twice = serialize_nodes(&parse_markup(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_markup_from_plain_text() {
        assert_eq!(
            markup_from_plain_text("a < b\r\nc & d"),
            "a &lt; b<br>c &amp; d"
        );
    }
}
