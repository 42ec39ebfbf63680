//! Single-document lookup.
//!
//! Builds the by-id `_search` request and projects its response into a
//! [`DocumentView`]. When a contextual query is given the document is
//! re-scored against it, so the highlight reflects the query the user came
//! from rather than the bare document.

use serde_json::{json, Value};

use crate::error::SearchError;
use crate::models::{DocumentHighlight, DocumentView, RawSearchResponse};
use crate::query::{FragmentPolicy, HighlightSpec, RelevanceClause, WeightedField, EXACT_FIELDS};

/// Tag fragments returned for a document lookup.
pub const DOCUMENT_TAG_FRAGMENTS: u64 = 5;

pub const PHRASE_FIELDS: [WeightedField; 2] =
    [WeightedField::new("title", 10), WeightedField::new("tags", 5)];
pub const PHRASE_SLOP: u32 = 2;
pub const PHRASE_BOOST: u32 = 2;

/// A by-id request, optionally re-scored against a query.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest {
    pub id: String,
    /// Trimmed, non-empty contextual query.
    pub query: Option<String>,
    /// Required clause; present only with a query.
    pub must: Option<RelevanceClause>,
    /// Phrase boost. The id filter leaves a single candidate, so this never
    /// changes which document is returned.
    pub should: Vec<RelevanceClause>,
    pub highlight: HighlightSpec,
}

impl DocumentRequest {
    pub fn to_body(&self) -> Value {
        let mut bool_q = serde_json::Map::new();
        bool_q.insert("filter".into(), json!([{ "term": { "_id": self.id } }]));
        if let Some(must) = &self.must {
            bool_q.insert("must".into(), must.to_json());
        }
        if !self.should.is_empty() {
            bool_q.insert(
                "should".into(),
                Value::Array(self.should.iter().map(|c| c.to_json()).collect()),
            );
        }

        json!({
            "size": 1,
            "query": { "bool": Value::Object(bool_q) },
            "highlight": self.highlight.to_json(),
        })
    }
}

/// Document highlight policy: whole title and body, five tag fragments.
pub fn document_highlight_spec(has_query: bool) -> HighlightSpec {
    HighlightSpec {
        title: FragmentPolicy::WholeField,
        body: FragmentPolicy::WholeField,
        tags: FragmentPolicy::Fragments {
            count: DOCUMENT_TAG_FRAGMENTS,
            size: None,
        },
        require_field_match: Some(has_query),
    }
}

/// Builds the by-id request. A blank `query` is treated as absent.
pub fn build_document_request(id: &str, query: Option<&str>) -> DocumentRequest {
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    let (must, should) = match &query {
        Some(q) => (
            Some(RelevanceClause::exact(q, &EXACT_FIELDS).with_fuzziness()),
            vec![RelevanceClause::phrase(
                q,
                &PHRASE_FIELDS,
                PHRASE_SLOP,
                PHRASE_BOOST,
            )],
        ),
        None => (None, Vec::new()),
    };

    DocumentRequest {
        id: id.to_string(),
        highlight: document_highlight_spec(query.is_some()),
        query,
        must,
        should,
    }
}

/// Projects a by-id response. Zero hits is [`SearchError::DocumentNotFound`].
pub fn project_document(id: &str, response: &RawSearchResponse) -> Result<DocumentView, SearchError> {
    let hit = response
        .hits
        .hits
        .first()
        .ok_or_else(|| SearchError::DocumentNotFound { id: id.to_string() })?;

    let tags = match hit.fragments("tags") {
        Some(frags) if !frags.is_empty() => Some(frags.clone()),
        _ => None,
    };

    Ok(DocumentView {
        data: hit.source.clone().unwrap_or_default(),
        highlight: DocumentHighlight {
            title: hit.first_fragment("title").cloned(),
            body: hit.first_fragment("body").cloned(),
            snippet: None,
            tags,
        },
    })
}
