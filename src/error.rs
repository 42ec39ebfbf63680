//! Error taxonomy for query construction and index round-trips.
//!
//! Only two failures are user-facing and decided locally
//! ([`SearchError::InvalidQuery`], [`SearchError::DocumentNotFound`]); every
//! failure of the index round-trip collapses into
//! [`SearchError::IndexUnavailable`]. Projection never fails.

/// Failures surfaced by the search service.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search text was missing or blank after trimming. Raised before any
    /// index call.
    #[error("Missing search query")]
    InvalidQuery,

    /// The id filter matched zero documents.
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The index call failed (transport error, non-2xx status, or an
    /// undecodable response body).
    #[error("Index unavailable: {source}")]
    IndexUnavailable {
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

impl SearchError {
    pub fn index_unavailable(source: anyhow::Error) -> Self {
        Self::IndexUnavailable { source }
    }
}
