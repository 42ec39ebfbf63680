//! Browse session.
//!
//! Holds the state a search front end keeps between round-trips: the draft
//! and active query, the current page of results, and the opened document.
//! Opening a result reconciles the list highlight with the document-context
//! highlight via [`crate::highlight::reconcile`].

use serde::Serialize;
use std::sync::Arc;

use crate::client::IndexClient;
use crate::error::SearchError;
use crate::highlight::{reconcile, ReconciledHighlight};
use crate::models::{DocumentSource, ResultItem};
use crate::query::PageParams;
use crate::service::{get_document, search_documents};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a keyword or phrase to search.";
pub const NO_MATCHES_MESSAGE: &str = "No documents matched your search. Try another keyword.";
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";
pub const LOAD_FAILED_MESSAGE: &str = "We couldn't load that document. Please try again.";

/// The document currently shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedDocument {
    pub id: String,
    pub data: DocumentSource,
    pub highlight: ReconciledHighlight,
}

/// Result of [`SearchSession::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Found,
    NoMatches,
}

impl SubmitOutcome {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SubmitOutcome::Found => None,
            SubmitOutcome::NoMatches => Some(NO_MATCHES_MESSAGE),
        }
    }
}

/// What the user was doing when a session call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Submitting a query or changing page.
    Search,
    /// Opening a result.
    Open,
}

/// User-facing message for a session failure. Any failure while opening a
/// document reads as a load failure.
pub fn user_message(err: &SearchError, operation: Operation) -> &'static str {
    match (operation, err) {
        (Operation::Open, _) => LOAD_FAILED_MESSAGE,
        (Operation::Search, SearchError::InvalidQuery) => EMPTY_QUERY_MESSAGE,
        (Operation::Search, _) => SEARCH_FAILED_MESSAGE,
    }
}

pub struct SearchSession {
    client: Arc<dyn IndexClient>,
    results_per_page: u64,
    draft_query: String,
    active_query: Option<String>,
    page: u64,
    total_pages: u64,
    total_results: u64,
    results: Vec<ResultItem>,
    selected: Option<SelectedDocument>,
}

impl SearchSession {
    /// `results_per_page` below the list endpoint's minimum is raised to it,
    /// so pagination decisions match the pages actually served.
    pub fn new(client: Arc<dyn IndexClient>, results_per_page: u64) -> Self {
        let results_per_page = PageParams::new(None, Some(results_per_page as i64)).limit;
        Self {
            client,
            results_per_page,
            draft_query: String::new(),
            active_query: None,
            page: 1,
            total_pages: 1,
            total_results: 0,
            results: Vec::new(),
            selected: None,
        }
    }

    /// Records what the user has typed without searching.
    pub fn set_draft(&mut self, query: &str) {
        self.draft_query = query.to_string();
    }

    /// Page size actually requested from the index.
    pub fn results_per_page(&self) -> u64 {
        self.results_per_page
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    pub fn selected(&self) -> Option<&SelectedDocument> {
        self.selected.as_ref()
    }

    /// More results exist than fit on one page.
    pub fn can_paginate(&self) -> bool {
        self.total_results > self.results_per_page
    }

    async fn fetch(&mut self, query: &str, page: u64) -> Result<(), SearchError> {
        let params = PageParams::new(Some(page as i64), Some(self.results_per_page as i64));
        let result = search_documents(self.client.as_ref(), query, params).await?;
        self.results = result.results;
        self.page = result.page;
        self.total_pages = result.total_pages;
        self.total_results = result.total;
        Ok(())
    }

    /// Runs a fresh search from page 1 and clears the opened document.
    pub async fn submit(&mut self, query: &str) -> Result<SubmitOutcome, SearchError> {
        self.draft_query = query.to_string();
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        self.selected = None;
        self.fetch(trimmed, 1).await?;
        self.active_query = Some(trimmed.to_string());

        Ok(if self.results.is_empty() {
            SubmitOutcome::NoMatches
        } else {
            SubmitOutcome::Found
        })
    }

    /// Moves to `next`. Returns `Ok(false)` without contacting the index when
    /// the move is a no-op or out of range, or nothing has been searched yet.
    pub async fn change_page(&mut self, next: u64) -> Result<bool, SearchError> {
        let query = match &self.active_query {
            Some(q) if next != self.page && next >= 1 && next <= self.total_pages => q.clone(),
            _ => return Ok(false),
        };
        self.fetch(&query, next).await?;
        Ok(true)
    }

    /// Opens a result, reconciling its list highlight with the document's.
    pub async fn open(&mut self, item: &ResultItem) -> Result<&SelectedDocument, SearchError> {
        let effective = match self.active_query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.draft_query.trim().to_string(),
        };
        let query = if effective.is_empty() {
            None
        } else {
            Some(effective.as_str())
        };

        let view = get_document(self.client.as_ref(), &item.id, query).await?;
        let highlight = reconcile(Some(item), Some(&view.highlight));

        let selected = self.selected.insert(SelectedDocument {
            id: item.id.clone(),
            data: view.data,
            highlight,
        });
        Ok(&*selected)
    }
}
