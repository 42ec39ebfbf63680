//! # Health Search
//!
//! Query construction and result projection for a full-text health
//! document search backed by OpenSearch.
//!
//! A free-text query becomes a two-strategy relevance request (exact
//! all-terms OR fuzzy any-term), the index response becomes a stable page of
//! highlighted results, and opening a result fetches the document re-scored
//! against the same query. The list highlight and the document highlight are
//! then reconciled into one.
//!
//! ## Architecture
//!
//! ```text
//!  query text ──▶ query::build_search_request ──┐
//!                                                ▼
//!                                     client::IndexClient ──▶ OpenSearch
//!                                                │
//!  page of results ◀── project::project_results ◀┘
//!        │ select
//!        ▼
//!  document::build_document_request ──▶ IndexClient ──▶ project_document
//!                                                          │
//!                        highlight::reconcile(item, doc) ◀─┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Raw index response and projected types |
//! | [`query`] | List-search request builder and pagination |
//! | [`project`] | List-result projection |
//! | [`document`] | By-id request builder and document projection |
//! | [`highlight`] | Highlight markers and reconciliation |
//! | [`client`] | Index client trait and OpenSearch implementation |
//! | [`service`] | Build → search → project orchestration |
//! | [`session`] | Browse-session state |
//! | [`server`] | HTTP server |
//! | [`commands`] | CLI output |
//! | [`logging`] | Tracing setup |

pub mod client;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod logging;
pub mod models;
pub mod project;
pub mod query;
pub mod server;
pub mod service;
pub mod session;
