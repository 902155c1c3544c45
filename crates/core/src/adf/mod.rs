//! Typed document model for ADF (Atlassian Document Format)
//!
//! ADF is the JSON tree structure Jira uses for rich-text fields such as
//! issue descriptions and comment bodies. This module defines the typed tree
//! plus the node/mark vocabularies; the sibling modules convert between ADF
//! and Markdown.

use serde::{Deserialize, Serialize};

mod parse;
mod render;

pub use parse::{markdown_to_adf, parse_inline, text_to_adf};
pub use render::{adf_to_markdown, description_to_markdown, CONVERSION_ERROR};

/// ADF schema version emitted on documents built by this crate
pub const ADF_VERSION: u64 = 1;

/// Free-form node/mark attributes (heading `level`, codeBlock `language`,
/// media `id`/`type`, link `href`, ...)
pub type Attrs = serde_json::Map<String, serde_json::Value>;

/// An ADF document root
///
/// A `doc` root always carries `version` and `content`; every other node may
/// omit `content`, in which case it renders as empty rather than erroring.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdfDoc {
    pub version: u64,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub content: Vec<AdfNode>,
}

impl AdfDoc {
    pub fn new(content: Vec<AdfNode>) -> Self {
        Self {
            version: ADF_VERSION,
            doc_type: "doc".to_string(),
            content,
        }
    }

    /// Serialize into the JSON value expected by Jira `description`/`body` fields
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A node in the ADF tree
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdfNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AdfNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<AdfMark>>,
}

/// Node vocabulary, resolved from the string tag
///
/// Rendering dispatches on this with an exhaustive `match`, so supporting a
/// new node type is a compile-time decision. Tags outside the vocabulary map
/// to [`NodeKind::Other`] and are treated as transparent containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    Text,
    BulletList,
    OrderedList,
    ListItem,
    CodeBlock,
    Blockquote,
    Rule,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    MediaGroup,
    Media,
    Mention,
    HardBreak,
    Other,
}

impl NodeKind {
    pub fn from_type(tag: &str) -> Self {
        match tag {
            "doc" => Self::Doc,
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "text" => Self::Text,
            "bulletList" => Self::BulletList,
            "orderedList" => Self::OrderedList,
            "listItem" => Self::ListItem,
            "codeBlock" => Self::CodeBlock,
            "blockquote" => Self::Blockquote,
            "rule" => Self::Rule,
            "table" => Self::Table,
            "tableRow" => Self::TableRow,
            "tableCell" => Self::TableCell,
            "tableHeader" => Self::TableHeader,
            "mediaGroup" => Self::MediaGroup,
            "media" => Self::Media,
            "mention" => Self::Mention,
            "hardBreak" => Self::HardBreak,
            _ => Self::Other,
        }
    }
}

impl AdfNode {
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type(&self.node_type)
    }

    /// Child nodes, or an empty slice when `content` is absent
    pub fn children(&self) -> &[AdfNode] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.as_ref()?.get(key)?.as_u64()
    }

    fn bare(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            text: None,
            content: None,
            attrs: None,
            marks: None,
        }
    }

    fn with_content(node_type: &str, content: Vec<AdfNode>) -> Self {
        Self {
            content: Some(content),
            ..Self::bare(node_type)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::bare("text")
        }
    }

    pub fn text_with_marks(text: impl Into<String>, marks: Vec<AdfMark>) -> Self {
        Self {
            marks: Some(marks),
            ..Self::text(text)
        }
    }

    pub fn paragraph(content: Vec<AdfNode>) -> Self {
        Self::with_content("paragraph", content)
    }

    pub fn heading(level: u64, content: Vec<AdfNode>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("level".to_string(), serde_json::Value::from(level));
        Self {
            attrs: Some(attrs),
            ..Self::with_content("heading", content)
        }
    }

    pub fn rule() -> Self {
        Self::bare("rule")
    }

    pub fn blockquote(content: Vec<AdfNode>) -> Self {
        Self::with_content("blockquote", content)
    }

    pub fn bullet_list(items: Vec<AdfNode>) -> Self {
        Self::with_content("bulletList", items)
    }

    pub fn list_item(content: Vec<AdfNode>) -> Self {
        Self::with_content("listItem", content)
    }
}

/// An inline style annotation attached to a `text` node
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdfMark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

/// Mark vocabulary; unknown marks are ignored by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Strong,
    Em,
    Code,
    Strike,
    Underline,
    Link,
    Other,
}

impl AdfMark {
    pub fn kind(&self) -> MarkKind {
        match self.mark_type.as_str() {
            "strong" => MarkKind::Strong,
            "em" => MarkKind::Em,
            "code" => MarkKind::Code,
            "strike" => MarkKind::Strike,
            "underline" => MarkKind::Underline,
            "link" => MarkKind::Link,
            _ => MarkKind::Other,
        }
    }

    /// Link target, for `link` marks
    pub fn href(&self) -> Option<&str> {
        self.attrs.as_ref()?.get("href")?.as_str()
    }

    fn bare(mark_type: &str) -> Self {
        Self {
            mark_type: mark_type.to_string(),
            attrs: None,
        }
    }

    pub fn strong() -> Self {
        Self::bare("strong")
    }

    pub fn em() -> Self {
        Self::bare("em")
    }

    pub fn code() -> Self {
        Self::bare("code")
    }

    pub fn strike() -> Self {
        Self::bare("strike")
    }

    pub fn link(href: impl Into<String>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("href".to_string(), serde_json::Value::from(href.into()));
        Self {
            attrs: Some(attrs),
            ..Self::bare("link")
        }
    }
}
