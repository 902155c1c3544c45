//! Pagination normalization across upstream pagination styles
//!
//! The Jira family of APIs paginates three different ways: offset-based
//! (`startAt`/`maxResults`/`total`), cursor-based (a `_links.next` URL
//! carrying a `cursor` parameter), and page-based (a `next` URL carrying a
//! `page` parameter). [`extract_pagination_info`] collapses all three into a
//! single descriptor the formatters can render a footer from.

use serde::{Deserialize, Serialize};

/// How an upstream list endpoint paginates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// Numeric start index and page size (`startAt`, `maxResults`, `total`)
    Offset,
    /// Opaque cursor token embedded in a next-page link
    Cursor,
    /// Page number embedded in a next-page link
    Page,
}

/// Normalized descriptor computed fresh per API response
///
/// Never persisted and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Items in the current page
    pub count: usize,
    /// True iff a strictly-next page is known to exist
    pub has_more: bool,
    /// Token for the next request: an offset rendered as a string, a decoded
    /// cursor, or a page number, depending on the style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

const ITEM_KEYS: [&str; 4] = ["issues", "values", "comments", "results"];

/// Extract the normalized descriptor from a raw page envelope
///
/// Total: anything missing or malformed degrades to `has_more: false`.
pub fn extract_pagination_info(
    raw: &serde_json::Value,
    style: PaginationStyle,
) -> PaginationInfo {
    match style {
        PaginationStyle::Offset => {
            let count = items_len(raw);

            // An explicit next-page token wins over offset arithmetic.
            if let Some(token) = raw.get("nextPage").and_then(|t| t.as_str()) {
                return PaginationInfo {
                    count,
                    has_more: true,
                    next_cursor: Some(token.to_string()),
                };
            }

            let start_at = raw.get("startAt").and_then(|v| v.as_u64());
            let max_results = raw.get("maxResults").and_then(|v| v.as_u64());
            let total = raw.get("total").and_then(|v| v.as_u64());

            match (start_at, max_results, total) {
                (Some(start), Some(max), Some(total)) if start + max < total => PaginationInfo {
                    count,
                    has_more: true,
                    next_cursor: Some((start + max).to_string()),
                },
                _ => PaginationInfo {
                    count,
                    ..Default::default()
                },
            }
        }
        PaginationStyle::Cursor => {
            let count = raw
                .get("results")
                .and_then(|v| v.as_array())
                .map(|a| a.len())
                .unwrap_or(0);
            let next = raw
                .get("_links")
                .and_then(|l| l.get("next"))
                .and_then(|n| n.as_str());

            from_next_link(count, next, "cursor")
        }
        PaginationStyle::Page => {
            let count = items_len(raw);
            let next = raw.get("next").and_then(|n| n.as_str());

            from_next_link(count, next, "page")
        }
    }
}

fn from_next_link(count: usize, next: Option<&str>, key: &str) -> PaginationInfo {
    match next.and_then(|url| query_param(url, key)) {
        Some(token) => PaginationInfo {
            count,
            has_more: true,
            next_cursor: Some(token),
        },
        None => PaginationInfo {
            count,
            ..Default::default()
        },
    }
}

fn items_len(raw: &serde_json::Value) -> usize {
    ITEM_KEYS
        .iter()
        .find_map(|key| raw.get(key).and_then(|v| v.as_array()))
        .map(|items| items.len())
        .unwrap_or(0)
}

/// Pull a single query parameter out of a URL, percent-decoded
fn query_param(url: &str, key: &str) -> Option<String> {
    let query = url.splitn(2, '?').nth(1)?;

    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some(key) {
            let raw = parts.next().unwrap_or("");
            return Some(
                urlencoding::decode(raw)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| raw.to_string()),
            );
        }
    }

    None
}
