//! Mention markup inside note text.
//!
//! A committed mention is stored in the editor buffer as `@[label]`. On save
//! the buffer is turned into a rich-text document (`doc` → `paragraph` →
//! `text`/`mention` nodes) and into HTML where each mention becomes a
//! `span.mention` carrying its label.

use serde_json::{json, Value};

const MENTION_PARENT_TYPES: [&str; 2] = ["paragraph", "taskItem"];

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Mention(String),
}

/// Paragraph node with mention children, serialized back to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct MentionParent {
    pub node: String,
    pub mentioned: Vec<String>,
}

/// Markup for a committed mention. `]` cannot appear inside the brackets and
/// is dropped from the label.
pub fn format_mention(trigger: char, label: &str) -> String {
    let clean: String = label.chars().filter(|c| *c != ']').collect();
    format!("{}[{}]", trigger, clean)
}

/// Split a line into plain text and mention segments.
pub fn parse_segments(line: &str, trigger: char) -> Vec<Segment> {
    let chars: Vec<char> = line.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == trigger && chars.get(i + 1) == Some(&'[') {
            if let Some(close) = chars[i + 2..].iter().position(|c| *c == ']') {
                let label: String = chars[i + 2..i + 2 + close].iter().collect();
                if !label.is_empty() {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Mention(label));
                    i += close + 3;
                    continue;
                }
            }
        }
        text.push(chars[i]);
        i += 1;
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Distinct mentioned labels in order of first appearance.
pub fn extract_mentions(text: &str, trigger: char) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for line in text.lines() {
        for segment in parse_segments(line, trigger) {
            if let Segment::Mention(label) = segment {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
    }
    labels
}

/// Rich-text document for `text`, one paragraph per line.
pub fn to_document(text: &str, trigger: char) -> Value {
    let paragraphs: Vec<Value> = text
        .lines()
        .map(|line| {
            let content: Vec<Value> = parse_segments(line, trigger)
                .into_iter()
                .map(|segment| match segment {
                    Segment::Text(t) => json!({"type": "text", "text": t}),
                    Segment::Mention(label) => {
                        json!({"type": "mention", "attrs": {"id": label, "label": label}})
                    }
                })
                .collect();
            if content.is_empty() {
                json!({"type": "paragraph"})
            } else {
                json!({"type": "paragraph", "content": content})
            }
        })
        .collect();
    json!({"type": "doc", "content": paragraphs})
}

pub fn render_html(text: &str, trigger: char) -> String {
    let mut html = String::new();
    for line in text.lines() {
        html.push_str("<p>");
        for segment in parse_segments(line, trigger) {
            match segment {
                Segment::Text(t) => html.push_str(&escape_html(&t)),
                Segment::Mention(label) => {
                    let label = escape_html(&label);
                    html.push_str(&format!(
                        "<span class=\"mention\" data-mention-id=\"{}\">{}{}</span>",
                        label, trigger, label
                    ));
                }
            }
        }
        html.push_str("</p>");
    }
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Editor text for a stored note: one line per `<p>`, mention spans back to
/// markup, every other tag dropped.
pub fn html_to_text(html: &str, trigger: char) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut in_mention = false;
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let Some(end) = after.find('>') else {
                line.push_str(&unescape_html(rest));
                break;
            };
            let tag = &after[..end];
            rest = &after[end + 1..];

            let closing = tag.starts_with('/');
            let name = tag
                .trim_start_matches('/')
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            match (name.as_str(), closing) {
                ("p", false) if !line.is_empty() => lines.push(std::mem::take(&mut line)),
                ("p", true) | ("br", false) => lines.push(std::mem::take(&mut line)),
                ("span", false) => {
                    if let Some(id) = attr_value(tag, "data-mention-id") {
                        line.push_str(&format_mention(trigger, &unescape_html(id)));
                        in_mention = true;
                    }
                }
                ("span", true) => in_mention = false,
                _ => {}
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            if !in_mention {
                line.push_str(&unescape_html(&rest[..end]));
            }
            rest = &rest[end..];
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let start = tag.find(&format!("{}=\"", name))? + name.len() + 2;
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Every `paragraph` or `taskItem` node that has a direct `mention` child,
/// in document order, with the ids of those mentions.
pub fn find_mention_parents(doc: &Value) -> Vec<MentionParent> {
    let mut parents = Vec::new();
    collect_mention_parents(doc, &mut parents);
    parents
}

fn collect_mention_parents(node: &Value, parents: &mut Vec<MentionParent>) {
    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return;
    };
    if children.is_empty() {
        return;
    }

    let node_type = node.get("type").and_then(Value::as_str).unwrap_or("");
    if MENTION_PARENT_TYPES.contains(&node_type) {
        let mentioned: Vec<String> = children
            .iter()
            .filter(|child| child.get("type").and_then(Value::as_str) == Some("mention"))
            .filter_map(|child| child.pointer("/attrs/id").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        let has_mention = children
            .iter()
            .any(|child| child.get("type").and_then(Value::as_str) == Some("mention"));
        if has_mention {
            parents.push(MentionParent {
                node: node.to_string(),
                mentioned,
            });
        }
    }

    for child in children {
        collect_mention_parents(child, parents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mention_wraps_label() {
        assert_eq!(format_mention('@', "garden"), "@[garden]");
        assert_eq!(format_mention('@', "a]b"), "@[ab]");
    }

    #[test]
    fn parse_segments_splits_text_and_mentions() {
        let segments = parse_segments("met @[alice] about @[garden].", '@');
        assert_eq!(
            segments,
            vec![
                Segment::Text("met ".into()),
                Segment::Mention("alice".into()),
                Segment::Text(" about ".into()),
                Segment::Mention("garden".into()),
                Segment::Text(".".into()),
            ]
        );
    }

    #[test]
    fn bare_trigger_and_unclosed_markup_stay_text() {
        assert_eq!(
            parse_segments("mail me @ home @[open", '@'),
            vec![Segment::Text("mail me @ home @[open".into())]
        );
        assert_eq!(
            parse_segments("@[]", '@'),
            vec![Segment::Text("@[]".into())]
        );
    }

    #[test]
    fn extract_mentions_dedups_in_order() {
        let text = "@[b] and @[a]\nagain @[b]";
        assert_eq!(extract_mentions(text, '@'), vec!["b", "a"]);
    }

    #[test]
    fn committed_markup_is_extracted() {
        let text = format!("todo {}", format_mention('#', "home reno"));
        assert_eq!(extract_mentions(&text, '#'), vec!["home reno"]);
    }

    #[test]
    fn to_document_builds_paragraphs() {
        let doc = to_document("hi @[x]\n", '@');
        assert_eq!(
            doc,
            json!({"type": "doc", "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "hi "},
                    {"type": "mention", "attrs": {"id": "x", "label": "x"}}
                ]}
            ]})
        );
    }

    #[test]
    fn render_html_escapes_and_marks_mentions() {
        let html = render_html("a<b @[R&D]\nsecond", '@');
        assert_eq!(
            html,
            "<p>a&lt;b <span class=\"mention\" data-mention-id=\"R&amp;D\">@R&amp;D</span></p><p>second</p>"
        );
    }

    #[test]
    fn html_to_text_reads_back_rendered_notes() {
        let text = "a<b @[R&D]\n\nsecond line";
        assert_eq!(html_to_text(&render_html(text, '@'), '@'), text);
    }

    #[test]
    fn html_to_text_drops_unknown_tags() {
        let html = "<p><strong>bold</strong> and <span class=\"x\">plain</span></p><p>b<br>c</p>";
        assert_eq!(html_to_text(html, '@'), "bold and plain\nb\nc");
    }

    #[test]
    fn html_to_text_handles_bare_text_and_empty_input() {
        assert_eq!(html_to_text("", '@'), "");
        assert_eq!(html_to_text("just text", '@'), "just text");
    }

    #[test]
    fn find_mention_parents_reports_paragraphs_and_task_items() {
        let doc = json!({"type": "doc", "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "plain"}]},
            {"type": "paragraph", "content": [
                {"type": "text", "text": "see "},
                {"type": "mention", "attrs": {"id": "alpha", "label": "alpha"}}
            ]},
            {"type": "taskList", "content": [
                {"type": "taskItem", "content": [
                    {"type": "mention", "attrs": {"id": "beta"}},
                    {"type": "mention", "attrs": {"id": "gamma"}}
                ]}
            ]},
            {"type": "heading", "content": [
                {"type": "mention", "attrs": {"id": "ignored"}}
            ]}
        ]});

        let parents = find_mention_parents(&doc);
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0].mentioned, vec!["alpha"]);
        assert_eq!(parents[1].mentioned, vec!["beta", "gamma"]);

        let node: Value = serde_json::from_str(&parents[0].node).unwrap();
        assert_eq!(node["type"], "paragraph");
    }

    #[test]
    fn find_mention_parents_on_generated_document() {
        let doc = to_document("one @[p1]\nnone\ntwo @[p2] @[p3]", '@');
        let parents = find_mention_parents(&doc);
        let mentioned: Vec<Vec<String>> = parents.into_iter().map(|p| p.mentioned).collect();
        assert_eq!(mentioned, vec![vec!["p1".to_string()], vec!["p2".into(), "p3".into()]]);
    }

    #[test]
    fn find_mention_parents_handles_empty_document() {
        assert!(find_mention_parents(&json!({"type": "doc"})).is_empty());
        assert!(find_mention_parents(&json!({"type": "doc", "content": []})).is_empty());
    }
}
