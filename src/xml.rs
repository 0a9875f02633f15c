//! Freeplane map serialization.

use crate::tree::Node;

pub const MAP_VERSION: &str = "freeplane 1.12.1";

const RICH_OPEN: &str = "<richcontent TYPE=\"NODE\"><html><body>";
const RICH_CLOSE: &str = "</body></html></richcontent>";

/// Serializes one node and its descendants as nested `<node>` elements.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    strip_layout_whitespace(&out)
}

/// Wraps the serialized tree in the `<map>` envelope.
pub fn render_map(root: &Node) -> String {
    let map = format!(
        "<map version=\"{MAP_VERSION}\">{}</map>",
        serialize_node(root)
    );
    strip_layout_whitespace(&map)
}

fn write_node(node: &Node, out: &mut String) {
    out.push_str("<node");
    if node.rich_content {
        out.push('>');
        out.push_str(RICH_OPEN);
        // Attribute values inside the fragment were escaped when the label was built.
        out.push_str(&node.label);
        out.push_str(RICH_CLOSE);
    } else {
        out.push_str(" TEXT=\"");
        out.push_str(&escape_html(&node.label));
        out.push_str("\">");
    }
    for child in &node.children {
        write_node(child, out);
    }
    out.push_str("</node>");
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drops newlines, tabs and every run of two or more whitespace characters.
///
/// Freeplane keeps whitespace inside text nodes, so none may leak into the map.
pub fn strip_layout_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            run.push(ch);
            continue;
        }
        flush_whitespace_run(&mut run, &mut out);
        out.push(ch);
    }
    flush_whitespace_run(&mut run, &mut out);
    out
}

fn flush_whitespace_run(run: &mut String, out: &mut String) {
    let mut chars = run.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch != '\n' && ch != '\t' {
            out.push(ch);
        }
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn strip_keeps_single_spaces() {
        assert_eq!(strip_layout_whitespace("a b"), "a b");
        assert_eq!(strip_layout_whitespace("a  b"), "ab");
        assert_eq!(strip_layout_whitespace("a\nb\tc"), "abc");
        assert_eq!(strip_layout_whitespace("<node>\n    <node>"), "<node><node>");
    }

    #[test]
    fn rich_node_has_no_text_attribute() {
        let xml = serialize_node(&Node::rich("<em>x</em>"));
        assert!(!xml.contains("TEXT="));
        assert!(xml.contains("<body><em>x</em></body>"));
    }
}
