//! Page fetching
//!
//! [`PageFetcher`] is the seam between the pagination driver and the
//! network: one call retrieves one page of a collection. [`ResourceFetcher`]
//! is the HTTP implementation; tests drive the paginator with stubs.

use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{CollectionRequest, PageEnvelope};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Retrieves a single page of a paginated collection
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch page `page` (one-indexed) of `request`.
    ///
    /// Records are left as raw JSON; the driver decodes them into the
    /// caller's record type.
    async fn fetch_page(
        &self,
        request: &CollectionRequest,
        page: u32,
    ) -> Result<PageEnvelope<JsonValue>>;
}

/// Fetches pages over HTTP
#[derive(Debug, Clone)]
pub struct ResourceFetcher {
    client: Arc<HttpClient>,
}

impl ResourceFetcher {
    /// Create a fetcher over a shared HTTP client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Fetch a single object, e.g. `/api/hosts/{id}`
    pub async fn fetch_one(&self, request: &CollectionRequest) -> Result<JsonValue> {
        self.client
            .get_json_with_config(&request.path, request_config(request))
            .await
    }
}

#[async_trait]
impl PageFetcher for ResourceFetcher {
    async fn fetch_page(
        &self,
        request: &CollectionRequest,
        page: u32,
    ) -> Result<PageEnvelope<JsonValue>> {
        debug!(path = %request.path, page, "fetching page");

        let config = request_config(request).query("page", page.to_string());
        self.client
            .get_json_with_config(&request.path, config)
            .await
    }
}

fn request_config(request: &CollectionRequest) -> RequestConfig {
    RequestConfig {
        path_params: request.path_params.clone(),
        query: request.query.clone(),
        ..RequestConfig::default()
    }
}
