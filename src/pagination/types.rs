//! Pagination types
//!
//! The page envelope, the description of a collection request and the
//! continue/stop decision shared by the driver and its tests.

use super::cursor::PageCursor;
use crate::error::Result;
use crate::types::{JsonValue, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sort block echoed back by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// One decoded page of a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    /// Records matching across all pages
    #[serde(default)]
    pub total: i64,
    /// Records matching the search filter
    #[serde(default)]
    pub subtotal: i64,
    /// Page the server says it returned
    #[serde(default)]
    pub page: PageCursor,
    /// Page size
    #[serde(default)]
    pub per_page: i64,
    #[serde(default)]
    pub search: Option<JsonValue>,
    #[serde(default)]
    pub sort: Sort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonValue>,
    pub results: Vec<T>,
}

impl<T> PageEnvelope<T> {
    /// Build an envelope (mainly for stub fetchers)
    pub fn new(results: Vec<T>, page: impl Into<PageCursor>, per_page: i64, total: i64) -> Self {
        Self {
            total,
            subtotal: total,
            page: page.into(),
            per_page,
            search: None,
            sort: Sort::default(),
            error: None,
            results,
        }
    }
}

/// A request for a paginated collection
///
/// `path` may contain `{name}` placeholders filled from `path_params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRequest {
    /// Endpoint template (e.g. `/api/hosts/{id}/packages`)
    pub path: String,
    /// Path parameter values
    pub path_params: StringMap,
    /// Extra query parameters (the driver adds `page`)
    pub query: StringMap,
}

impl CollectionRequest {
    /// Create a request for an endpoint template
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            path_params: HashMap::new(),
            query: HashMap::new(),
        }
    }

    /// Set a path parameter
    #[must_use]
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter when a value is present
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }
}

/// Decision taken after a page has been fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this page next
    Continue(u32),
    /// All pages retrieved
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }
}

/// Decide whether another page follows `page`.
///
/// Continues while `per_page * cursor < total`. The cursor only feeds the
/// comparison; the next page is always `page + 1`, so a total that
/// overcounts cannot make the driver revisit pages.
pub fn next_page<T>(envelope: &PageEnvelope<T>, page: u32) -> Result<NextPage> {
    let cursor = envelope.page.normalize()?;
    if envelope.per_page.saturating_mul(cursor) < envelope.total {
        Ok(NextPage::Continue(page.saturating_add(1)))
    } else {
        Ok(NextPage::Done)
    }
}

/// Counters for a single listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// Pages fetched
    pub pages_fetched: u32,
    /// Records handed to the consumer
    pub records_emitted: u64,
}

impl ListingStats {
    /// Record a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Record an emitted record
    pub fn add_record(&mut self) {
        self.records_emitted += 1;
    }
}
