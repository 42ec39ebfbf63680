//! List-search query construction.
//!
//! Turns a raw query string plus raw pagination parameters into a
//! [`SearchRequest`]: two `multi_match` strategies OR-ed together (an exact
//! all-terms match and a fuzzy any-term match) and the list highlight policy.
//!
//! ```rust
//! use health_search::query::{build_search_request, PageParams};
//!
//! let params = PageParams::from_raw(Some("2"), Some("5"));
//! let req = build_search_request("diabetes", params).unwrap();
//! assert_eq!(req.offset, 5);
//! assert_eq!(req.to_body()["size"], 5);
//! ```

use serde_json::{json, Value};

use crate::error::SearchError;
use crate::highlight::{MARK_CLOSE, MARK_OPEN};

/// Smallest page size the list endpoint will serve.
pub const MIN_LIMIT: u64 = 5;
/// Body fragment length for list highlights.
pub const BODY_FRAGMENT_SIZE: u64 = 200;
/// Tag fragments returned per list hit.
pub const LIST_TAG_FRAGMENTS: u64 = 3;

// ============ Pagination ============

/// Normalized pagination: `page >= 1`, `limit >= MIN_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: MIN_LIMIT,
        }
    }
}

impl PageParams {
    /// Coerces already-parsed values. Absent or too-small values are
    /// replaced, never rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) => l.max(MIN_LIMIT as i64) as u64,
            None => MIN_LIMIT,
        };
        let page = match page {
            Some(p) => p.max(1) as u64,
            None => 1,
        };
        Self { page, limit }
    }

    /// Coerces raw query-string values using integer-prefix parsing.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            page.and_then(parse_int_prefix),
            limit.and_then(parse_int_prefix),
        )
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `max(ceil(total / limit), 1)`.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit).max(1)
    }
}

/// Parses the leading integer of `raw`: whitespace is skipped, a sign is
/// accepted, then the longest run of ASCII digits. Returns `None` when no
/// digit follows. Values beyond `i64` saturate.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = &rest[..rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

// ============ Relevance clauses ============

/// A field name with a relevance boost, rendered as `name^boost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedField {
    pub name: &'static str,
    pub boost: u32,
}

impl WeightedField {
    pub const fn new(name: &'static str, boost: u32) -> Self {
        Self { name, boost }
    }

    pub fn render(&self) -> String {
        if self.boost == 1 {
            self.name.to_string()
        } else {
            format!("{}^{}", self.name, self.boost)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    BestFields,
    Phrase { slop: u32 },
}

/// One `multi_match` scoring strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceClause {
    pub query: String,
    pub fields: Vec<WeightedField>,
    pub match_type: Option<MatchType>,
    pub operator: Option<Operator>,
    pub fuzzy: bool,
    pub boost: Option<u32>,
}

impl RelevanceClause {
    /// All terms must match; best-matching field scores.
    pub fn exact(query: &str, fields: &[WeightedField]) -> Self {
        Self {
            query: query.to_string(),
            fields: fields.to_vec(),
            match_type: Some(MatchType::BestFields),
            operator: Some(Operator::And),
            fuzzy: false,
            boost: None,
        }
    }

    /// Any term may match, within automatic edit-distance tolerance.
    pub fn fuzzy_any(query: &str, fields: &[WeightedField]) -> Self {
        Self {
            query: query.to_string(),
            fields: fields.to_vec(),
            match_type: None,
            operator: Some(Operator::Or),
            fuzzy: true,
            boost: None,
        }
    }

    /// Phrase match with positional slop and a clause-level boost.
    pub fn phrase(query: &str, fields: &[WeightedField], slop: u32, boost: u32) -> Self {
        Self {
            query: query.to_string(),
            fields: fields.to_vec(),
            match_type: Some(MatchType::Phrase { slop }),
            operator: None,
            fuzzy: false,
            boost: Some(boost),
        }
    }

    pub fn with_fuzziness(mut self) -> Self {
        self.fuzzy = true;
        self
    }

    pub fn to_json(&self) -> Value {
        let mut mm = serde_json::Map::new();
        mm.insert("query".into(), json!(self.query));
        mm.insert(
            "fields".into(),
            json!(self.fields.iter().map(|f| f.render()).collect::<Vec<_>>()),
        );
        match self.match_type {
            Some(MatchType::BestFields) => {
                mm.insert("type".into(), json!("best_fields"));
            }
            Some(MatchType::Phrase { slop }) => {
                mm.insert("type".into(), json!("phrase"));
                mm.insert("slop".into(), json!(slop));
            }
            None => {}
        }
        if let Some(op) = self.operator {
            mm.insert("operator".into(), json!(op.as_str()));
        }
        if self.fuzzy {
            mm.insert("fuzziness".into(), json!("AUTO"));
        }
        if let Some(boost) = self.boost {
            mm.insert("boost".into(), json!(boost));
        }
        json!({ "multi_match": Value::Object(mm) })
    }
}

pub const EXACT_FIELDS: [WeightedField; 3] = [
    WeightedField::new("title", 8),
    WeightedField::new("tags", 4),
    WeightedField::new("body", 2),
];

pub const FUZZY_FIELDS: [WeightedField; 3] = [
    WeightedField::new("title", 6),
    WeightedField::new("tags", 3),
    WeightedField::new("body", 1),
];

// ============ Highlight policy ============

/// How one field is fragmented for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentPolicy {
    /// Highlight the whole field value.
    WholeField,
    /// At most `count` fragments, each at most `size` chars when given.
    Fragments { count: u64, size: Option<u64> },
}

impl FragmentPolicy {
    fn to_json(self) -> Value {
        match self {
            FragmentPolicy::WholeField => json!({ "number_of_fragments": 0 }),
            FragmentPolicy::Fragments {
                count,
                size: Some(size),
            } => json!({ "fragment_size": size, "number_of_fragments": count }),
            FragmentPolicy::Fragments { count, size: None } => {
                json!({ "number_of_fragments": count })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpec {
    pub title: FragmentPolicy,
    pub body: FragmentPolicy,
    pub tags: FragmentPolicy,
    /// Emitted only when set.
    pub require_field_match: Option<bool>,
}

impl HighlightSpec {
    /// List search: whole title, one 200-char body fragment, three tag fragments.
    pub fn list() -> Self {
        Self {
            title: FragmentPolicy::WholeField,
            body: FragmentPolicy::Fragments {
                count: 1,
                size: Some(BODY_FRAGMENT_SIZE),
            },
            tags: FragmentPolicy::Fragments {
                count: LIST_TAG_FRAGMENTS,
                size: None,
            },
            require_field_match: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut hl = serde_json::Map::new();
        if let Some(rfm) = self.require_field_match {
            hl.insert("require_field_match".into(), json!(rfm));
        }
        hl.insert(
            "fields".into(),
            json!({
                "title": self.title.to_json(),
                "body": self.body.to_json(),
                "tags": self.tags.to_json(),
            }),
        );
        hl.insert("pre_tags".into(), json!([MARK_OPEN]));
        hl.insert("post_tags".into(), json!([MARK_CLOSE]));
        Value::Object(hl)
    }
}

// ============ Search request ============

/// A list-search request ready to send to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u64,
    pub offset: u64,
    pub limit: u64,
    /// OR-ed together; at least one must match.
    pub strategies: Vec<RelevanceClause>,
    pub highlight: HighlightSpec,
}

impl SearchRequest {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Renders the OpenSearch `_search` body.
    pub fn to_body(&self) -> Value {
        let should: Vec<Value> = self.strategies.iter().map(|c| c.to_json()).collect();
        json!({
            "from": self.offset,
            "size": self.limit,
            "query": {
                "bool": {
                    "should": should,
                    "minimum_should_match": 1,
                }
            },
            "highlight": self.highlight.to_json(),
        })
    }
}

/// Builds the list-search request.
///
/// Fails with [`SearchError::InvalidQuery`] when `query` is blank after
/// trimming.
pub fn build_search_request(query: &str, params: PageParams) -> Result<SearchRequest, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidQuery);
    }

    Ok(SearchRequest {
        query: query.to_string(),
        page: params.page,
        offset: params.offset(),
        limit: params.limit,
        strategies: vec![
            RelevanceClause::exact(query, &EXACT_FIELDS),
            RelevanceClause::fuzzy_any(query, &FUZZY_FIELDS),
        ],
        highlight: HighlightSpec::list(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("20"), Some(20));
        assert_eq!(parse_int_prefix("  7"), Some(7));
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("3.9"), Some(3));
        assert_eq!(parse_int_prefix("-4"), Some(-4));
        assert_eq!(parse_int_prefix("+6"), Some(6));
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix("NaN"), None);
        assert_eq!(parse_int_prefix("Infinity"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_limit_defaults_and_floor() {
        assert_eq!(PageParams::from_raw(None, None).limit, 5);
        assert_eq!(PageParams::from_raw(None, Some("abc")).limit, 5);
        assert_eq!(PageParams::from_raw(None, Some("1")).limit, 5);
        assert_eq!(PageParams::from_raw(None, Some("-10")).limit, 5);
        assert_eq!(PageParams::from_raw(None, Some("20")).limit, 20);
    }

    #[test]
    fn test_page_defaults_and_floor() {
        assert_eq!(PageParams::from_raw(None, None).page, 1);
        assert_eq!(PageParams::from_raw(Some("x"), None).page, 1);
        assert_eq!(PageParams::from_raw(Some("0"), None).page, 1);
        assert_eq!(PageParams::from_raw(Some("-3"), None).page, 1);
        assert_eq!(PageParams::from_raw(Some("4"), None).page, 4);
    }

    #[test]
    fn test_offset() {
        for (page, limit) in [(1, 5), (2, 5), (3, 20), (10, 7)] {
            let p = PageParams::new(Some(page), Some(limit));
            assert_eq!(p.offset(), (p.page - 1) * p.limit);
        }
        assert_eq!(PageParams::new(Some(2), Some(5)).offset(), 5);
    }

    #[test]
    fn test_total_pages() {
        let p = PageParams::new(None, Some(5));
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(5), 1);
        assert_eq!(p.total_pages(12), 3);
        assert_eq!(p.total_pages(15), 3);
    }

    #[test]
    fn test_blank_query_rejected() {
        for q in ["", "   ", "\t\n"] {
            assert!(matches!(
                build_search_request(q, PageParams::default()),
                Err(SearchError::InvalidQuery)
            ));
        }
    }

    #[test]
    fn test_query_is_trimmed() {
        let req = build_search_request("  malaria  ", PageParams::default()).unwrap();
        assert_eq!(req.query, "malaria");
        assert_eq!(req.strategies[0].query, "malaria");
    }

    #[test]
    fn test_body_shape() {
        let req = build_search_request("diabetes", PageParams::new(Some(2), Some(5))).unwrap();
        let body = req.to_body();
        assert_eq!(body["from"], 5);
        assert_eq!(body["size"], 5);

        let b = &body["query"]["bool"];
        assert_eq!(b["minimum_should_match"], 1);
        let should = b["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);

        let exact = &should[0]["multi_match"];
        assert_eq!(exact["query"], "diabetes");
        assert_eq!(exact["fields"], json!(["title^8", "tags^4", "body^2"]));
        assert_eq!(exact["type"], "best_fields");
        assert_eq!(exact["operator"], "and");
        assert!(exact.get("fuzziness").is_none());

        let fuzzy = &should[1]["multi_match"];
        assert_eq!(fuzzy["fields"], json!(["title^6", "tags^3", "body"]));
        assert_eq!(fuzzy["fuzziness"], "AUTO");
        assert_eq!(fuzzy["operator"], "or");
        assert!(fuzzy.get("type").is_none());
    }

    #[test]
    fn test_list_highlight_shape() {
        let hl = HighlightSpec::list().to_json();
        assert_eq!(hl["fields"]["title"], json!({"number_of_fragments": 0}));
        assert_eq!(
            hl["fields"]["body"],
            json!({"fragment_size": 200, "number_of_fragments": 1})
        );
        assert_eq!(hl["fields"]["tags"], json!({"number_of_fragments": 3}));
        assert_eq!(hl["pre_tags"], json!(["<mark>"]));
        assert_eq!(hl["post_tags"], json!(["</mark>"]));
        assert!(hl.get("require_field_match").is_none());
    }
}
