//! ADF to Markdown rendering
//!
//! Jira descriptions and comment bodies arrive either as plain strings or as
//! ADF documents. [`adf_to_markdown`] accepts both, walks the typed tree and
//! emits Markdown. The conversion is total: a formatting failure must never
//! abort an otherwise-successful fetch, so every failure path degrades to a
//! string.

use super::{AdfNode, MarkKind, NodeKind};

/// Sentinel returned when a description cannot be converted
pub const CONVERSION_ERROR: &str = "*Error converting description format*";

/// Render an ADF value (or plain string) to Markdown
///
/// - `null` and non-object scalars render as `""`.
/// - String input is first parsed as JSON; if parsing fails the string is
///   returned unchanged (already-plain-text descriptions).
/// - An object without a `content` array renders as `""`.
/// - Any internal conversion failure yields [`CONVERSION_ERROR`].
pub fn adf_to_markdown(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {
            Ok(parsed) if parsed.is_object() => render_document(&parsed),
            _ => s.clone(),
        },
        serde_json::Value::Object(_) => render_document(value),
        _ => String::new(),
    }
}

/// Adapt an optional Jira description/body field for the output models
pub fn description_to_markdown(value: Option<serde_json::Value>) -> Option<String> {
    let rendered = adf_to_markdown(&value?);
    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

fn render_document(value: &serde_json::Value) -> String {
    let content = match value.get("content").and_then(|c| c.as_array()) {
        Some(content) => content,
        None => return String::new(),
    };

    let nodes: Vec<AdfNode> =
        match serde_json::from_value(serde_json::Value::Array(content.clone())) {
            Ok(nodes) => nodes,
            Err(_) => return CONVERSION_ERROR.to_string(),
        };

    render_blocks(&nodes)
}

/// Render sibling block nodes, joined with a blank line
fn render_blocks(nodes: &[AdfNode]) -> String {
    nodes
        .iter()
        .map(render_node)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_node(node: &AdfNode) -> String {
    match node.kind() {
        NodeKind::Doc => render_blocks(node.children()),
        NodeKind::Paragraph => render_paragraph(node.children()),
        NodeKind::Heading => {
            // Level is taken as-is; clamping is the editor's concern.
            let level = node.attr_u64("level").unwrap_or(1) as usize;
            let body: String = node.children().iter().map(render_node).collect();
            format!("{} {}", "#".repeat(level), body)
        }
        NodeKind::BulletList => node
            .children()
            .iter()
            .map(render_node)
            .collect::<Vec<_>>()
            .join("\n"),
        NodeKind::OrderedList => node
            .children()
            .iter()
            .map(render_node)
            .enumerate()
            .map(|(index, item)| match item.strip_prefix("- ") {
                Some(rest) => format!("{}. {}", index + 1, rest),
                None => item,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        NodeKind::ListItem => render_list_item(node.children()),
        NodeKind::CodeBlock => {
            let language = node.attr_str("language").unwrap_or_default();
            let body: String = node.children().iter().map(render_node).collect();
            format!("```{language}\n{body}\n```")
        }
        NodeKind::Blockquote => {
            let inner = render_blocks(node.children());
            inner
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
        NodeKind::Rule => "---".to_string(),
        NodeKind::Table => render_table(node.children()),
        NodeKind::MediaGroup => node
            .children()
            .iter()
            .filter_map(render_media)
            .collect::<Vec<_>>()
            .join("\n"),
        NodeKind::Media => render_media(node).unwrap_or_default(),
        NodeKind::Text => render_text(node),
        NodeKind::Mention => render_mention(node),
        NodeKind::HardBreak => "\n".to_string(),
        // Row/cell nodes are consumed by the table renderer; reaching one
        // outside a table falls back to the transparent-container rule.
        NodeKind::TableRow | NodeKind::TableCell | NodeKind::TableHeader | NodeKind::Other => {
            render_blocks(node.children())
        }
    }
}

fn render_paragraph(children: &[AdfNode]) -> String {
    let mut out = String::new();
    let mut prev_was_text = false;

    for child in children {
        let rendered = render_node(child);
        let is_text = child.kind() == NodeKind::Text;

        // Two adjacent text runs glued without whitespace would merge words.
        if prev_was_text
            && is_text
            && !rendered.is_empty()
            && !out.is_empty()
            && !out.ends_with(char::is_whitespace)
            && !rendered.starts_with(char::is_whitespace)
        {
            out.push(' ');
        }

        out.push_str(&rendered);
        prev_was_text = is_text;
    }

    out
}

fn render_list_item(children: &[AdfNode]) -> String {
    let mut out = String::new();

    for child in children {
        match child.kind() {
            NodeKind::BulletList | NodeKind::OrderedList => {
                let nested = render_node(child);
                let indented = nested
                    .lines()
                    .map(|line| format!("  {line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push('\n');
                out.push_str(&indented);
            }
            _ => out.push_str(&render_node(child)),
        }
    }

    format!("- {out}")
}

fn render_table(rows: &[AdfNode]) -> String {
    let cells_per_row: Vec<Vec<String>> = rows
        .iter()
        .filter(|row| row.kind() == NodeKind::TableRow)
        .map(|row| {
            row.children()
                .iter()
                .filter(|cell| {
                    matches!(cell.kind(), NodeKind::TableCell | NodeKind::TableHeader)
                })
                .map(|cell| {
                    cell.children()
                        .iter()
                        .map(render_node)
                        .collect::<String>()
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .collect();

    let columns = cells_per_row.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(cells_per_row.len() + 1);
    for (index, mut cells) in cells_per_row.into_iter().enumerate() {
        cells.resize(columns, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));
        if index == 0 {
            lines.push(format!("| {} |", vec!["---"; columns].join(" | ")));
        }
    }

    lines.join("\n")
}

fn render_text(node: &AdfNode) -> String {
    let mut text = node.text.clone().unwrap_or_default();
    let mut link: Option<&str> = None;

    for mark in node.marks.as_deref().unwrap_or(&[]) {
        match mark.kind() {
            MarkKind::Strong => text = format!("**{text}**"),
            MarkKind::Em => text = format!("*{text}*"),
            MarkKind::Code => text = format!("`{text}`"),
            MarkKind::Strike => text = format!("~~{text}~~"),
            // Markdown has no underline; `_x_` is the conventional stand-in.
            MarkKind::Underline => text = format!("_{text}_"),
            MarkKind::Link => link = mark.href(),
            MarkKind::Other => {}
        }
    }

    // The link wraps the already-decorated text, so it applies last.
    if let Some(href) = link {
        text = format!("[{text}]({href})");
    }

    text
}

fn render_mention(node: &AdfNode) -> String {
    let name = node
        .attr_str("text")
        .or_else(|| node.attr_str("displayName"))
        .or_else(|| node.attr_str("id"));

    match name {
        // Source values often carry their own @; strip it to avoid @@name.
        Some(name) => format!("@{}", name.strip_prefix('@').unwrap_or(name)),
        None => String::new(),
    }
}

fn render_media(node: &AdfNode) -> Option<String> {
    if node.kind() != NodeKind::Media {
        return None;
    }

    match node.attr_str("type") {
        Some("file") => Some(format!(
            "[Attachment: {}]",
            node.attr_str("id").unwrap_or_default()
        )),
        Some("link") => Some("[External Link]".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_input_renders_empty() {
        assert_eq!(adf_to_markdown(&serde_json::Value::Null), "");
    }

    #[test]
    fn test_plain_string_passes_through_unchanged() {
        // A description that is not JSON stays as-is
        let value = json!("Just a plain description");
        assert_eq!(adf_to_markdown(&value), "Just a plain description");
    }

    #[test]
    fn test_string_holding_adf_json_is_parsed() {
        let raw = r#"{"version":1,"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"inlined"}]}]}"#;
        let value = json!(raw);
        assert_eq!(adf_to_markdown(&value), "inlined");
    }

    #[test]
    fn test_object_without_content_renders_empty() {
        let value = json!({"foo": "bar"});
        assert_eq!(adf_to_markdown(&value), "");
    }

    #[test]
    fn test_malformed_content_degrades_to_sentinel() {
        // A node without a type tag cannot be converted
        let value = json!({"type": "doc", "content": [{"text": "orphan"}]});
        assert_eq!(adf_to_markdown(&value), CONVERSION_ERROR);
    }

    #[test]
    fn test_paragraph_with_adjacent_text_runs() {
        // Arrange: "Hello " already ends with whitespace, so no extra space
        let value = json!({
            "version": 1,
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "text", "text": "world", "marks": [{"type": "strong"}]}
                ]
            }]
        });

        // Act + Assert
        assert_eq!(adf_to_markdown(&value), "Hello **world**");
    }

    #[test]
    fn test_paragraph_inserts_space_between_merged_runs() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "left"},
                    {"type": "text", "text": "right"}
                ]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "left right");
    }

    #[test]
    fn test_blocks_join_with_blank_line() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "one"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "two"}]}
            ]
        });
        assert_eq!(adf_to_markdown(&value), "one\n\ntwo");
    }

    #[test]
    fn test_heading_level_is_not_clamped() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "heading",
                "attrs": {"level": 3},
                "content": [{"type": "text", "text": "Deep"}]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "### Deep");
    }

    #[test]
    fn test_heading_defaults_to_level_one() {
        let value = json!({
            "type": "doc",
            "content": [{"type": "heading", "content": [{"type": "text", "text": "Top"}]}]
        });
        assert_eq!(adf_to_markdown(&value), "# Top");
    }

    #[test]
    fn test_ordered_list_renumbers_items() {
        let item = |text: &str| {
            json!({
                "type": "listItem",
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
            })
        };
        let value = json!({
            "type": "doc",
            "content": [{"type": "orderedList", "content": [item("a"), item("b"), item("c")]}]
        });
        assert_eq!(adf_to_markdown(&value), "1. a\n2. b\n3. c");
    }

    #[test]
    fn test_nested_list_is_indented_under_its_item() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "bulletList",
                "content": [{
                    "type": "listItem",
                    "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "outer"}]},
                        {"type": "bulletList", "content": [{
                            "type": "listItem",
                            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "inner"}]}]
                        }]}
                    ]
                }]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "- outer\n  - inner");
    }

    #[test]
    fn test_code_block_with_language() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "codeBlock",
                "attrs": {"language": "rust"},
                "content": [{"type": "text", "text": "let x = 1;"}]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn test_empty_code_block_still_emits_fence() {
        let value = json!({
            "type": "doc",
            "content": [{"type": "codeBlock"}]
        });
        assert_eq!(adf_to_markdown(&value), "```\n\n```");
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "blockquote",
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "first"}]},
                    {"type": "paragraph", "content": [{"type": "text", "text": "second"}]}
                ]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "> first\n> \n> second");
    }

    #[test]
    fn test_rule_renders_as_dashes() {
        let value = json!({"type": "doc", "content": [{"type": "rule"}]});
        assert_eq!(adf_to_markdown(&value), "---");
    }

    #[test]
    fn test_media_group_attachments_and_links() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "mediaGroup",
                "content": [
                    {"type": "media", "attrs": {"type": "file", "id": "abc-123"}},
                    {"type": "media", "attrs": {"type": "link"}},
                    {"type": "media", "attrs": {"type": "external"}}
                ]
            }]
        });
        assert_eq!(
            adf_to_markdown(&value),
            "[Attachment: abc-123]\n[External Link]"
        );
    }

    #[test]
    fn test_table_pads_rows_and_synthesizes_separator() {
        let cell = |tag: &str, text: &str| {
            json!({
                "type": tag,
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
            })
        };
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "table",
                "content": [
                    {"type": "tableRow", "content": [cell("tableHeader", "Name"), cell("tableHeader", "Value")]},
                    {"type": "tableRow", "content": [cell("tableCell", "x")]}
                ]
            }]
        });
        assert_eq!(
            adf_to_markdown(&value),
            "| Name | Value |\n| --- | --- |\n| x |  |"
        );
    }

    #[test]
    fn test_link_mark_wraps_decorated_text() {
        // Link must apply after the other marks
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{
                    "type": "text",
                    "text": "text",
                    "marks": [
                        {"type": "strong"},
                        {"type": "link", "attrs": {"href": "http://x"}}
                    ]
                }]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "[**text**](http://x)");
    }

    #[test]
    fn test_underline_falls_back_to_underscores() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{"type": "text", "text": "u", "marks": [{"type": "underline"}]}]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "_u_");
    }

    #[test]
    fn test_mention_strips_duplicate_at_sign() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{"type": "mention", "attrs": {"text": "@Jane Doe"}}]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "@Jane Doe");
    }

    #[test]
    fn test_unknown_node_with_content_is_transparent() {
        let value = json!({
            "type": "doc",
            "content": [{
                "type": "panel",
                "attrs": {"panelType": "info"},
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": "note"}]}]
            }]
        });
        assert_eq!(adf_to_markdown(&value), "note");
    }

    #[test]
    fn test_unknown_leaf_node_renders_empty() {
        let value = json!({
            "type": "doc",
            "content": [{"type": "emoji", "attrs": {"shortName": ":smile:"}}]
        });
        assert_eq!(adf_to_markdown(&value), "");
    }

    #[test]
    fn test_description_to_markdown_filters_empty() {
        assert_eq!(description_to_markdown(None), None);
        assert_eq!(description_to_markdown(Some(json!({"type": "doc", "content": []}))), None);
        assert_eq!(
            description_to_markdown(Some(json!("plain"))),
            Some("plain".to_string())
        );
    }
}
