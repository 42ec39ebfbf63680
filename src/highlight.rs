//! Highlight markers and list/detail highlight reconciliation.
//!
//! The list search and the by-id lookup compute highlights independently
//! (different weights, different fragmentation). When a result is opened
//! both exist; [`reconcile`] merges them into one [`ReconciledHighlight`].
//!
//! Each output field is resolved from an ordered candidate table, evaluated
//! top-down, first present value wins:
//!
//! | Field | Candidates (highest first) |
//! |-------|----------------------------|
//! | `title` | doc title → item highlight title → item title if marked |
//! | `snippet` | item highlight snippet → item snippet if marked |
//! | `body` | doc body → doc snippet → `snippet` |
//! | `tags` | non-empty doc tags → item highlight tags → `[]` |

use serde::Serialize;

use crate::models::{DocumentHighlight, ResultItem};

/// Opening highlight marker sent as the index `pre_tags`.
pub const MARK_OPEN: &str = "<mark>";
/// Closing highlight marker sent as the index `post_tags`.
pub const MARK_CLOSE: &str = "</mark>";

/// Returns `true` when `value` contains an opening or closing `mark` tag,
/// compared case-insensitively.
pub fn contains_highlight_markup(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains(MARK_OPEN) || lower.contains(MARK_CLOSE)
}

/// Merged highlight shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ReconciledHighlight {
    pub title: Option<String>,
    /// List-oriented snippet, kept for consumers that still read it.
    pub snippet: Option<String>,
    /// Canonical detail-view highlight.
    pub body: Option<String>,
    pub tags: Vec<String>,
}

/// One row of a precedence table: the candidate counts only when `present`.
struct Candidate<T> {
    present: bool,
    value: T,
}

impl<T> Candidate<T> {
    fn option(value: Option<T>) -> Option<Self> {
        value.map(|v| Candidate {
            present: true,
            value: v,
        })
    }

    fn when(present: bool, value: T) -> Option<Self> {
        Some(Candidate { present, value })
    }
}

/// Walks a precedence table top-down and returns the first present value.
fn first_present<T>(table: Vec<Option<Candidate<T>>>) -> Option<T> {
    table
        .into_iter()
        .flatten()
        .find(|c| c.present)
        .map(|c| c.value)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    match value {
        Some(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn marked(value: Option<&String>) -> Option<Candidate<String>> {
    match value {
        Some(s) => Candidate::when(contains_highlight_markup(s), s.clone()),
        None => None,
    }
}

/// Merges a list item's highlight with the freshly fetched document highlight.
///
/// Either side may be absent (an item selected without a prior search, or a
/// lookup that produced no highlight). Pure and idempotent.
pub fn reconcile(item: Option<&ResultItem>, doc: Option<&DocumentHighlight>) -> ReconciledHighlight {
    let item_hl = item.map(|i| &i.highlight);

    let title = first_present(vec![
        Candidate::option(non_empty(doc.and_then(|d| d.title.as_ref()))),
        Candidate::option(non_empty(item_hl.and_then(|h| h.title.as_ref()))),
        marked(item.and_then(|i| i.title.as_ref())),
    ]);

    let list_snippet = first_present(vec![
        Candidate::option(non_empty(item_hl.and_then(|h| h.snippet.as_ref()))),
        marked(item.map(|i| &i.snippet)),
    ]);

    let body = first_present(vec![
        Candidate::option(non_empty(doc.and_then(|d| d.body.as_ref()))),
        Candidate::option(non_empty(doc.and_then(|d| d.snippet.as_ref()))),
        Candidate::option(list_snippet.clone()),
    ]);

    let tags = first_present(vec![
        Candidate::option(doc.and_then(|d| d.tags.clone()).filter(|t| !t.is_empty())),
        Candidate::option(item_hl.map(|h| h.tags.clone())),
    ])
    .unwrap_or_default();

    ReconciledHighlight {
        title,
        snippet: list_snippet,
        body,
        tags,
    }
}
