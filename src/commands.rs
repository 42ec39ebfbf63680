//! CLI entry points for `hsearch search` and `hsearch get`.
//!
//! Each command runs the same service code as the HTTP server and prints a
//! plain-text rendering to stdout. Highlight markers are kept as-is so the
//! terminal shows exactly what a browser would emphasize.

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::client::IndexClient;
use crate::config::Config;
use crate::error::SearchError;
use crate::highlight::ReconciledHighlight;
use crate::models::{DocumentSource, DocumentView, ResultItem, SearchPage};
use crate::query::PageParams;
use crate::service::get_document;
use crate::session::{user_message, Operation, SearchSession, SubmitOutcome};

/// `hsearch search`: one page of results, optionally opening one of them.
pub async fn run_search(
    client: Arc<dyn IndexClient>,
    config: &Config,
    query: &str,
    page: Option<i64>,
    limit: Option<i64>,
    open: Option<usize>,
) -> Result<()> {
    let out = render_search(client, config, query, page, limit, open).await?;
    print!("{}", out);
    Ok(())
}

/// Runs a search session and renders what `hsearch search` prints.
///
/// A `page` past the last page of results is an error rather than a silent
/// fall back to page 1.
pub async fn render_search(
    client: Arc<dyn IndexClient>,
    config: &Config,
    query: &str,
    page: Option<i64>,
    limit: Option<i64>,
    open: Option<usize>,
) -> Result<String> {
    let params = PageParams::new(page, limit.or(Some(config.search.results_per_page as i64)));

    let mut session = SearchSession::new(client, params.limit);
    let outcome = match session.submit(query).await {
        Ok(o) => o,
        Err(e) => return Err(report(e, Operation::Search)),
    };
    if params.page > 1 && outcome == SubmitOutcome::Found {
        match session.change_page(params.page).await {
            Ok(true) => {}
            Ok(false) => bail!(
                "--page {} is out of range (\"{}\" has {} pages)",
                params.page,
                query.trim(),
                session.total_pages()
            ),
            Err(e) => return Err(report(e, Operation::Search)),
        }
    }

    let snapshot = SearchPage {
        results: session.results().to_vec(),
        total: session.total_results(),
        page: session.page(),
        total_pages: session.total_pages(),
    };
    let mut out = format_page(&snapshot, session.results_per_page());
    if let Some(msg) = outcome.message() {
        out.push_str(msg);
        out.push('\n');
        return Ok(out);
    }

    if let Some(k) = open {
        let item = match k.checked_sub(1).and_then(|i| session.results().get(i)) {
            Some(item) => item.clone(),
            None => bail!(
                "--open {} is out of range (this page has {} results)",
                k,
                session.results().len()
            ),
        };
        let selected = match session.open(&item).await {
            Ok(s) => s,
            Err(e) => return Err(report(e, Operation::Open)),
        };
        out.push('\n');
        out.push_str(&format_document(&selected.data, &selected.highlight));
    }

    Ok(out)
}

/// `hsearch get`: one document with its document-context highlight.
pub async fn run_get(client: Arc<dyn IndexClient>, id: &str, query: Option<&str>) -> Result<()> {
    let out = render_get(client, id, query).await?;
    print!("{}", out);
    Ok(())
}

pub async fn render_get(
    client: Arc<dyn IndexClient>,
    id: &str,
    query: Option<&str>,
) -> Result<String> {
    let view: DocumentView = match get_document(client.as_ref(), id, query).await {
        Ok(v) => v,
        Err(SearchError::DocumentNotFound { id }) => bail!("document not found: {}", id),
        Err(e) => return Err(report(e, Operation::Open)),
    };

    let highlight = ReconciledHighlight {
        title: view.highlight.title.clone(),
        snippet: None,
        body: view.highlight.body.clone(),
        tags: view.highlight.tags.clone().unwrap_or_default(),
    };
    Ok(format_document(&view.data, &highlight))
}

fn report(err: SearchError, operation: Operation) -> anyhow::Error {
    let message = user_message(&err, operation);
    anyhow::Error::new(err).context(message)
}

fn format_item(rank: u64, item: &ResultItem) -> String {
    let title = item.title.as_deref().unwrap_or("(untitled)");
    let mut out = format!(
        "{}. [{:.2}] {}\n",
        rank,
        item.score.unwrap_or(0.0),
        title
    );
    let origin: Vec<String> = [
        item.category.clone(),
        item.source.clone(),
        item.year.as_ref().map(year_display),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !origin.is_empty() {
        out.push_str(&format!("    {}\n", origin.join(" · ")));
    }
    if let Some(tags) = item.tags.as_ref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("    tags: {}\n", tags.join(", ")));
    }
    out.push_str(&format!(
        "    excerpt: \"{}\"\n",
        item.snippet.replace('\n', " ").trim()
    ));
    out.push_str(&format!("    id: {}\n", item.id));
    out
}

pub fn format_page(page: &SearchPage, limit: u64) -> String {
    let mut out = format!(
        "{} results · page {} of {}\n\n",
        page.total, page.page, page.total_pages
    );
    for (i, item) in page.results.iter().enumerate() {
        let rank = (page.page - 1) * limit + i as u64 + 1;
        out.push_str(&format_item(rank, item));
        out.push('\n');
    }
    out
}

fn year_display(year: &serde_json::Value) -> String {
    match year {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn format_document(data: &DocumentSource, highlight: &ReconciledHighlight) -> String {
    let mut out = String::from("--- Document ---\n");
    let title = highlight
        .title
        .as_deref()
        .or(data.title.as_deref())
        .unwrap_or("(untitled)");
    out.push_str(&format!("title:    {}\n", title));
    if let Some(c) = &data.category {
        out.push_str(&format!("category: {}\n", c));
    }
    if let Some(s) = &data.source {
        out.push_str(&format!("source:   {}\n", s));
    }
    if let Some(y) = &data.year {
        out.push_str(&format!("year:     {}\n", year_display(y)));
    }
    if let Some(u) = &data.url {
        out.push_str(&format!("url:      {}\n", u));
    }
    let tags = if highlight.tags.is_empty() {
        data.tags.clone().unwrap_or_default()
    } else {
        highlight.tags.clone()
    };
    if !tags.is_empty() {
        out.push_str(&format!("tags:     {}\n", tags.join(", ")));
    }

    out.push_str("\n--- Body ---\n");
    let body = highlight
        .body
        .as_deref()
        .or(data.body.as_deref())
        .unwrap_or("");
    out.push_str(body);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemHighlight;
    use serde_json::json;

    fn item(id: &str) -> ResultItem {
        ResultItem {
            id: id.into(),
            score: Some(2.5),
            title: Some("<mark>Malaria</mark> prevention".into()),
            snippet: "Bed nets\nand spraying".into(),
            tags: Some(vec!["vector control".into()]),
            category: Some("Infectious disease".into()),
            source: Some("WHO".into()),
            year: Some(json!(2022)),
            highlight: ItemHighlight::default(),
        }
    }

    #[test]
    fn test_format_page_ranks_across_pages() {
        let page = SearchPage {
            results: vec![item("a"), item("b")],
            total: 4,
            page: 2,
            total_pages: 2,
        };
        let out = format_page(&page, 2);
        assert!(out.starts_with("4 results · page 2 of 2"));
        assert!(out.contains("3. [2.50] <mark>Malaria</mark> prevention"));
        assert!(out.contains("4. [2.50]"));
        assert!(out.contains("Infectious disease · WHO · 2022"));
        assert!(out.contains("excerpt: \"Bed nets and spraying\""));
    }

    #[test]
    fn test_format_document_prefers_highlight() {
        let data = DocumentSource {
            title: Some("Malaria".into()),
            body: Some("plain body".into()),
            tags: Some(vec!["nets".into()]),
            ..Default::default()
        };
        let hl = ReconciledHighlight {
            body: Some("<mark>plain</mark> body".into()),
            ..Default::default()
        };
        let out = format_document(&data, &hl);
        assert!(out.contains("title:    Malaria"));
        assert!(out.contains("tags:     nets"));
        assert!(out.contains("<mark>plain</mark> body"));
    }
}
