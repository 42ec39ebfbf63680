//! Search orchestration.
//!
//! Validates and builds the request, runs it through an [`IndexClient`], and
//! projects the response. Shared by the CLI, the HTTP server and
//! [`crate::session::SearchSession`].

use tracing::{debug, error};

use crate::client::IndexClient;
use crate::document::{build_document_request, project_document};
use crate::error::SearchError;
use crate::models::{DocumentView, SearchPage};
use crate::project::project_results;
use crate::query::{build_search_request, PageParams};

/// Runs a list search. Blank queries fail before the index is contacted.
pub async fn search_documents(
    client: &dyn IndexClient,
    query: &str,
    params: PageParams,
) -> Result<SearchPage, SearchError> {
    let request = build_search_request(query, params)?;
    let body = request.to_body();
    debug!(query = %request.query, page = request.page, offset = request.offset, limit = request.limit, "list search");

    let response = client.search(&body).await.map_err(|e| {
        error!(error = %format!("{:#}", e), query = %request.query, "search failed");
        SearchError::index_unavailable(e)
    })?;

    let page = project_results(&response, request.page_params());
    debug!(total = page.total, returned = page.results.len(), "list search done");
    Ok(page)
}

/// Fetches one document, re-scored against `query` when given.
pub async fn get_document(
    client: &dyn IndexClient,
    id: &str,
    query: Option<&str>,
) -> Result<DocumentView, SearchError> {
    let request = build_document_request(id, query);
    debug!(id = %id, query = ?request.query, "document lookup");

    let response = client.search(&request.to_body()).await.map_err(|e| {
        error!(error = %format!("{:#}", e), id = %id, "document lookup failed");
        SearchError::index_unavailable(e)
    })?;

    project_document(id, &response)
}
