//! Core data types.
//!
//! Two families live here: the raw OpenSearch response as it comes off the
//! wire ([`RawSearchResponse`] and friends), and the projected value objects
//! handed to callers ([`SearchPage`], [`ResultItem`], [`DocumentView`]).
//! Every field the index may omit is an `Option`; fallbacks are applied by
//! the projectors, not here.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

// ============ Raw index response ============

/// Top-level `_search` response body.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub hits: RawHits,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHits {
    #[serde(default)]
    pub total: Option<RawTotal>,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// `hits.total`, which OpenSearch reports as an object (or a bare number on
/// legacy clusters).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTotal {
    Object { value: Option<u64> },
    Count(u64),
}

impl RawTotal {
    pub fn value(&self) -> Option<u64> {
        match self {
            RawTotal::Object { value } => *value,
            RawTotal::Count(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<DocumentSource>,
    #[serde(default)]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

impl RawHit {
    /// First fragment for `field`, treating an empty fragment as absent.
    pub fn first_fragment(&self, field: &str) -> Option<&String> {
        self.highlight
            .as_ref()
            .and_then(|h| h.get(field))
            .and_then(|frags| frags.first())
            .filter(|s| !s.is_empty())
    }

    /// All fragments for `field`, if the index returned any.
    pub fn fragments(&self, field: &str) -> Option<&Vec<String>> {
        self.highlight.as_ref().and_then(|h| h.get(field))
    }
}

/// The stored document (`_source`).
///
/// Known fields are typed; anything else the ingestion pipeline stored is
/// kept verbatim in `extra` so the detail view can return the full source.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct DocumentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============ Projected list results ============

/// Highlight sub-object of a list result.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ItemHighlight {
    pub title: Option<String>,
    /// Body fragment, else first tag fragment.
    pub snippet: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One projected hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultItem {
    pub id: String,
    pub score: Option<f64>,
    /// Highlighted title if the index produced one, else the stored title.
    pub title: Option<String>,
    /// Highlighted fragment, else a truncated body, else `""`.
    pub snippet: String,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub year: Option<serde_json::Value>,
    pub highlight: ItemHighlight,
}

/// A page of list results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<ResultItem>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

// ============ Projected document ============

/// Highlight block of a single-document lookup.
///
/// `tags` is `None` when the index returned no tag fragments; it serializes
/// as an empty array either way. `snippet` is only populated by legacy
/// payloads and is never produced by the document projector.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DocumentHighlight {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, serialize_with = "tags_or_empty")]
    pub tags: Option<Vec<String>>,
}

fn tags_or_empty<S: Serializer>(tags: &Option<Vec<String>>, s: S) -> Result<S::Ok, S::Error> {
    match tags {
        Some(t) => t.serialize(s),
        None => Vec::<String>::new().serialize(s),
    }
}

/// Full document plus its document-context highlight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentView {
    pub data: DocumentSource,
    pub highlight: DocumentHighlight,
}
