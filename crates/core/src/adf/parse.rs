//! Markdown to ADF parsing
//!
//! Comments and descriptions written on the command line are Markdown; Jira
//! wants ADF. [`markdown_to_adf`] covers the block subset (headings, rules,
//! blockquotes, bullet lists, paragraphs) and [`parse_inline`] the inline
//! subset (links, bold, italic, code, strikethrough). [`text_to_adf`] is the
//! plain-text path used when no Markdown interpretation is wanted.

use regex::Regex;

use super::{AdfDoc, AdfMark, AdfNode};

/// Parse a Markdown string into an ADF document
///
/// Blank lines are skipped; a document that collapses to nothing yields a
/// single empty paragraph, the structural minimum some API consumers rely on.
pub fn markdown_to_adf(markdown: &str) -> AdfDoc {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut content: Vec<AdfNode> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some((level, rest)) = heading_line(line) {
            content.push(AdfNode::heading(level, parse_inline(rest)));
        } else if is_rule_line(line) {
            content.push(AdfNode::rule());
        } else if let Some(rest) = line.strip_prefix('>') {
            let inner = rest.strip_prefix(' ').unwrap_or(rest);
            content.push(AdfNode::blockquote(vec![AdfNode::paragraph(parse_inline(
                inner,
            ))]));
        } else if bullet_line(line).is_some() {
            // Consume the whole contiguous run into one list.
            let mut items = Vec::new();
            while i < lines.len() {
                match bullet_line(lines[i].trim()) {
                    Some(rest) => {
                        items.push(AdfNode::list_item(vec![AdfNode::paragraph(parse_inline(
                            rest,
                        ))]));
                        i += 1;
                    }
                    None => break,
                }
            }
            content.push(AdfNode::bullet_list(items));
            continue;
        } else {
            content.push(AdfNode::paragraph(parse_inline(line)));
        }

        i += 1;
    }

    if content.is_empty() {
        content.push(AdfNode::paragraph(Vec::new()));
    }

    AdfDoc::new(content)
}

/// Wrap plain text as ADF, one paragraph per non-empty line
pub fn text_to_adf(text: &str) -> AdfDoc {
    let content: Vec<AdfNode> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| AdfNode::paragraph(vec![AdfNode::text(line)]))
        .collect();

    if content.is_empty() {
        return AdfDoc::new(vec![AdfNode::paragraph(Vec::new())]);
    }

    AdfDoc::new(content)
}

fn heading_line(line: &str) -> Option<(u64, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 {
        return None;
    }

    let rest = line[hashes..].trim_start();
    if rest.is_empty() {
        return None;
    }

    // ADF headings go from 1 to 6.
    Some((hashes.min(6) as u64, rest))
}

fn is_rule_line(line: &str) -> bool {
    line == "***" || line == "---" || (line.len() >= 3 && line.bytes().all(|b| b == b'_'))
}

fn bullet_line(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

#[derive(Debug, Clone, Copy)]
enum InlineToken {
    Link,
    Bold,
    Italic,
    Code,
    Strike,
}

/// Parse inline Markdown into a run of ADF text nodes
///
/// All patterns compete positionally: the match starting earliest wins and
/// scanning resumes after it. Sequential per-pattern replacement would
/// mis-handle overlapping markup such as bold text containing a link. Ties at
/// the same offset resolve in declaration order, which is why bold is listed
/// before italic.
pub fn parse_inline(text: &str) -> Vec<AdfNode> {
    let patterns = [
        (
            InlineToken::Link,
            Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
        ),
        (InlineToken::Bold, Regex::new(r"\*\*([^*]+)\*\*").unwrap()),
        (InlineToken::Italic, Regex::new(r"\*([^*]+)\*").unwrap()),
        (InlineToken::Code, Regex::new(r"`([^`]+)`").unwrap()),
        (InlineToken::Strike, Regex::new(r"~~([^~]+)~~").unwrap()),
    ];

    let mut nodes = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut earliest: Option<(usize, InlineToken, regex::Captures)> = None;

        for (token, pattern) in &patterns {
            if let Some(caps) = pattern.captures(rest) {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                if earliest.as_ref().is_none_or(|(best, _, _)| start < *best) {
                    earliest = Some((start, *token, caps));
                }
            }
        }

        let Some((start, token, caps)) = earliest else {
            nodes.push(AdfNode::text(rest));
            break;
        };

        if start > 0 {
            nodes.push(AdfNode::text(&rest[..start]));
        }

        nodes.push(match token {
            InlineToken::Link => {
                AdfNode::text_with_marks(&caps[1], vec![AdfMark::link(&caps[2])])
            }
            InlineToken::Bold => AdfNode::text_with_marks(&caps[1], vec![AdfMark::strong()]),
            InlineToken::Italic => AdfNode::text_with_marks(&caps[1], vec![AdfMark::em()]),
            InlineToken::Code => AdfNode::text_with_marks(&caps[1], vec![AdfMark::code()]),
            InlineToken::Strike => AdfNode::text_with_marks(&caps[1], vec![AdfMark::strike()]),
        });

        let end = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
        rest = &rest[end..];
    }

    nodes
}
