//! In-memory stand-in for the OpenSearch index.
//!
//! Understands just enough of the request bodies built by this crate to
//! behave like the real index on a small fixture: term matching over
//! title/tags/body, `from`/`size` paging, the `_id` filter, and `<mark>`
//! highlighting.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use health_search::client::IndexClient;
use health_search::models::RawSearchResponse;
use serde_json::{json, Value};
use std::sync::Mutex;

pub struct FixtureDoc {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub year: u32,
}

pub fn diabetes_fixture() -> Vec<FixtureDoc> {
    let topics = [
        ("Type 2 diabetes overview", "type 2 diabetes is a chronic condition affecting blood glucose", vec!["diabetes", "ncd"]),
        ("Diabetes and diet", "a balanced diet lowers the risk of diabetes complications", vec!["nutrition"]),
        ("Insulin access", "insulin remains unaffordable for many people living with diabetes", vec!["insulin", "medicines"]),
        ("Gestational diabetes", "screening for diabetes during pregnancy protects mother and child", vec!["maternal health"]),
        ("Diabetic retinopathy", "diabetes is a leading cause of preventable blindness", vec!["eye care"]),
        ("Physical activity", "regular activity helps prevent diabetes and heart disease", vec!["exercise"]),
        ("Diabetes in children", "type 1 diabetes in children requires lifelong insulin", vec!["insulin", "children"]),
        ("Foot care", "foot ulcers are a serious complication of diabetes", vec!["complications"]),
        ("Diabetes surveillance", "national surveys track diabetes prevalence over time", vec!["data"]),
        ("Sugar-sweetened beverages", "taxes on sugary drinks reduce diabetes risk factors", vec!["policy"]),
        ("Kidney disease", "diabetes is a major driver of chronic kidney disease", vec!["kidney"]),
        ("Self-management", "education supports people with diabetes to manage their condition", vec!["education"]),
    ];

    topics
        .into_iter()
        .enumerate()
        .map(|(i, (title, body, tags))| FixtureDoc {
            id: format!("who-{:03}", i + 1),
            title: title.to_string(),
            body: body.to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            year: 2010 + i as u32,
        })
        .collect()
}

/// Wraps every case-insensitive occurrence of each term in `<mark>` tags.
/// Fixture text is ASCII, so lowercase byte offsets line up with the input.
fn mark_terms(text: &str, terms: &[String]) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        let mut start = 0;
        while let Some(pos) = lower[start..].find(term.as_str()) {
            let s = start + pos;
            spans.push((s, s + term.len()));
            start = s + term.len();
        }
    }
    if spans.is_empty() {
        return None;
    }
    spans.sort();
    let mut out = String::new();
    let mut cursor = 0;
    for (s, e) in spans {
        if s < cursor {
            continue;
        }
        out.push_str(&text[cursor..s]);
        out.push_str("<mark>");
        out.push_str(&text[s..e]);
        out.push_str("</mark>");
        cursor = e;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

fn terms_of(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

impl FixtureDoc {
    fn matches(&self, terms: &[String]) -> bool {
        let hay = format!("{} {} {}", self.title, self.body, self.tags.join(" ")).to_ascii_lowercase();
        terms.iter().any(|t| hay.contains(t.as_str()))
    }

    fn hit(&self, terms: &[String], score: f64) -> Value {
        let mut highlight = serde_json::Map::new();
        if let Some(t) = mark_terms(&self.title, terms) {
            highlight.insert("title".into(), json!([t]));
        }
        if let Some(b) = mark_terms(&self.body, terms) {
            highlight.insert("body".into(), json!([b]));
        }
        let tags: Vec<String> = self
            .tags
            .iter()
            .filter_map(|t| mark_terms(t, terms))
            .collect();
        if !tags.is_empty() {
            highlight.insert("tags".into(), json!(tags));
        }

        let mut hit = json!({
            "_id": self.id,
            "_score": score,
            "_source": {
                "title": self.title,
                "body": self.body,
                "tags": self.tags,
                "category": "Noncommunicable diseases",
                "source": "WHO",
                "year": self.year,
                "url": format!("https://example.org/{}", self.id),
            }
        });
        if !highlight.is_empty() {
            hit["highlight"] = Value::Object(highlight);
        }
        hit
    }
}

/// Fake index that records every request body it receives.
pub struct FixtureIndex {
    docs: Vec<FixtureDoc>,
    pub requests: Mutex<Vec<Value>>,
}

impl FixtureIndex {
    pub fn new(docs: Vec<FixtureDoc>) -> Self {
        Self {
            docs,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Value> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn by_id(&self, id: &str, body: &Value) -> Value {
        let query = body["query"]["bool"]["must"]["multi_match"]["query"]
            .as_str()
            .unwrap_or("");
        let terms = terms_of(query);
        let hits: Vec<Value> = self
            .docs
            .iter()
            .filter(|d| d.id == id)
            .filter(|d| terms.is_empty() || d.matches(&terms))
            .map(|d| d.hit(&terms, 1.0))
            .collect();
        json!({ "hits": { "total": { "value": hits.len() }, "hits": hits } })
    }

    fn list(&self, body: &Value) -> Value {
        let query = body["query"]["bool"]["should"][0]["multi_match"]["query"]
            .as_str()
            .unwrap_or("");
        let terms = terms_of(query);
        let from = body["from"].as_u64().unwrap_or(0) as usize;
        let size = body["size"].as_u64().unwrap_or(10) as usize;

        let matched: Vec<&FixtureDoc> = self.docs.iter().filter(|d| d.matches(&terms)).collect();
        let total = matched.len();
        let hits: Vec<Value> = matched
            .into_iter()
            .enumerate()
            .skip(from)
            .take(size)
            .map(|(rank, d)| d.hit(&terms, 10.0 - rank as f64 * 0.5))
            .collect();
        json!({ "hits": { "total": { "value": total }, "hits": hits } })
    }
}

#[async_trait]
impl IndexClient for FixtureIndex {
    async fn search(&self, body: &Value) -> Result<RawSearchResponse> {
        self.requests.lock().unwrap().push(body.clone());

        let raw = match body["query"]["bool"]["filter"][0]["term"]["_id"].as_str() {
            Some(id) => self.by_id(id, body),
            None => self.list(body),
        };
        Ok(serde_json::from_value(raw)?)
    }
}

/// Index that fails every call, like an unreachable cluster.
pub struct DownIndex;

#[async_trait]
impl IndexClient for DownIndex {
    async fn search(&self, _body: &Value) -> Result<RawSearchResponse> {
        bail!("connection refused")
    }
}

/// Index that serves list searches from the fixture but fails every by-id
/// lookup, so results can be listed and then fail to open.
pub struct ListOnlyIndex {
    inner: FixtureIndex,
}

impl ListOnlyIndex {
    pub fn new(docs: Vec<FixtureDoc>) -> Self {
        Self {
            inner: FixtureIndex::new(docs),
        }
    }
}

#[async_trait]
impl IndexClient for ListOnlyIndex {
    async fn search(&self, body: &Value) -> Result<RawSearchResponse> {
        if body["query"]["bool"]["filter"].is_array() {
            bail!("connection reset by peer");
        }
        self.inner.search(body).await
    }
}
