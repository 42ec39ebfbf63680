//! Result projection.
//!
//! Maps a raw `_search` response onto a [`SearchPage`]. Hit order is kept
//! exactly as the index returned it. Missing optional fields never fail the
//! projection; each one degrades through its fallback chain.

use crate::models::{ItemHighlight, RawHit, RawSearchResponse, ResultItem, SearchPage};
use crate::query::PageParams;

/// Characters of body text kept in a plain (unhighlighted) snippet.
pub const SNIPPET_CHARS: usize = 200;

/// Plain snippet: the first [`SNIPPET_CHARS`] characters of `body` followed by
/// `"..."`, or `""` when there is no body.
pub fn fallback_snippet(body: Option<&str>) -> String {
    match body {
        Some(b) if !b.is_empty() => {
            let head: String = b.chars().take(SNIPPET_CHARS).collect();
            format!("{head}...")
        }
        _ => String::new(),
    }
}

/// Highlight snippet: body fragment, else first tag fragment.
fn highlight_snippet(hit: &RawHit) -> Option<String> {
    match (hit.first_fragment("body"), hit.first_fragment("tags")) {
        (Some(body), _) => Some(body.clone()),
        (None, Some(tag)) => Some(tag.clone()),
        (None, None) => None,
    }
}

pub fn project_hit(hit: &RawHit) -> ResultItem {
    let source = hit.source.clone().unwrap_or_default();

    let highlight = ItemHighlight {
        title: hit.first_fragment("title").cloned(),
        snippet: highlight_snippet(hit),
        tags: hit.fragments("tags").cloned().unwrap_or_default(),
    };

    let title = match &highlight.title {
        Some(t) => Some(t.clone()),
        None => source.title.clone(),
    };

    let snippet = match &highlight.snippet {
        Some(s) => s.clone(),
        None => fallback_snippet(source.body.as_deref()),
    };

    ResultItem {
        id: hit.id.clone(),
        score: hit.score,
        title,
        snippet,
        tags: source.tags,
        category: source.category,
        source: source.source,
        year: source.year,
        highlight,
    }
}

/// Projects a list-search response for the page described by `params`.
pub fn project_results(response: &RawSearchResponse, params: PageParams) -> SearchPage {
    let total = response
        .hits
        .total
        .as_ref()
        .and_then(|t| t.value())
        .unwrap_or(0);

    SearchPage {
        results: response.hits.hits.iter().map(project_hit).collect(),
        total,
        page: params.page,
        total_pages: params.total_pages(total),
    }
}
