//! Satellite client facade
//!
//! Entry point for callers: builds collection requests for the hosts,
//! host packages and host errata endpoints, resolves host names and wires
//! the paginator to the join-context sink.

use crate::config::SatelliteConfig;
use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, ResourceFetcher};
use crate::http::HttpClient;
use crate::models::{Errata, Host, HostPackage};
use crate::pagination::{CollectionRequest, Paginator, RecordStream};
use crate::resolver::{AmbiguityPolicy, HostResolver};
use crate::sink::{JoinContext, Scoped, StreamingSink};
use futures::{stream, StreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Hosts collection
pub const HOSTS_PATH: &str = "/api/hosts";
/// A single host, by id or name
pub const HOST_PATH: &str = "/api/hosts/{id}";
/// Packages installed on a host
pub const HOST_PACKAGES_PATH: &str = "/api/hosts/{id}/packages";
/// Errata applicable to a host
pub const HOST_ERRATA_PATH: &str = "/api/hosts/{id}/errata";

/// Which host(s) a package or errata listing covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostScope {
    /// Numeric host id
    Id(i64),
    /// Host name, resolved to an id first
    Name(String),
    /// Every host visible to the account, in host listing order
    All,
}

/// Filters for the hosts listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostQuery {
    /// Satellite search expression (e.g. `os = RedHat`)
    pub search: Option<String>,
    /// Only return id and name
    pub thin: bool,
    /// Page size requested from the server
    pub per_page: Option<u32>,
}

impl HostQuery {
    /// Ids and names only
    pub fn thin() -> Self {
        Self {
            thin: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn into_request(self) -> CollectionRequest {
        let request = CollectionRequest::new(HOSTS_PATH)
            .query_opt("search", self.search)
            .query_opt("per_page", self.per_page.map(|n| n.to_string()));
        if self.thin {
            request.query("thin", "true")
        } else {
            request
        }
    }
}

/// Streaming client for the Satellite REST API
///
/// Cheap to clone; clones share the HTTP client and its rate limiter.
#[derive(Clone)]
pub struct SatelliteClient {
    fetcher: ResourceFetcher,
    pages: Arc<dyn PageFetcher>,
    resolver: Arc<HostResolver>,
}

impl SatelliteClient {
    /// Create a client over an existing HTTP client
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_policy(http, AmbiguityPolicy::default())
    }

    /// Create a client with an explicit host name resolution policy
    pub fn with_policy(http: Arc<HttpClient>, policy: AmbiguityPolicy) -> Self {
        let fetcher = ResourceFetcher::new(http);
        let pages: Arc<dyn PageFetcher> = Arc::new(fetcher.clone());
        let resolver = HostResolver::new(Arc::clone(&pages)).with_policy(policy);

        Self {
            fetcher,
            pages,
            resolver: Arc::new(resolver),
        }
    }

    /// Validate a config and build a client from it
    pub fn from_config(config: SatelliteConfig) -> Result<Self> {
        let policy = config.host_name_policy;
        let http = config.into_client()?;
        Ok(Self::with_policy(Arc::new(http), policy))
    }

    /// The shared HTTP client
    pub fn http(&self) -> &Arc<HttpClient> {
        self.fetcher.client()
    }

    /// Stream every record of a paginated collection, wrapped with `join`
    pub fn list_collection<T>(
        &self,
        request: CollectionRequest,
        join: Option<JoinContext>,
        cancel: CancellationToken,
    ) -> RecordStream<Scoped<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        debug!(path = %request.path, ?join, "starting listing");
        let records = Paginator::<T>::new(Arc::clone(&self.pages), request, cancel).into_stream();
        StreamingSink::new(join).attach(records)
    }

    /// Stream hosts
    pub fn list_hosts(&self, query: HostQuery, cancel: CancellationToken) -> RecordStream<Host> {
        let records = self.list_collection::<Host>(query.into_request(), None, cancel);
        Box::pin(records.map(|item| item.map(Scoped::into_inner)))
    }

    /// Fetch one host by numeric id or by name
    pub async fn get_host(&self, id_or_name: &str) -> Result<Host> {
        let request = CollectionRequest::new(HOST_PATH).path_param("id", id_or_name);
        let value = self.fetcher.fetch_one(&request).await?;
        serde_json::from_value(value).map_err(|e| Error::decode(format!("host: {e}")))
    }

    /// Resolve a host name to its id
    pub async fn resolve_host(&self, name: &str) -> Result<i64> {
        self.resolver.resolve(name).await
    }

    /// Stream the packages installed on the hosts in `scope`
    pub async fn list_host_packages(
        &self,
        scope: HostScope,
        cancel: CancellationToken,
    ) -> Result<RecordStream<Scoped<HostPackage>>> {
        self.list_host_children(HOST_PACKAGES_PATH, scope, cancel)
            .await
    }

    /// Stream the errata applicable to the hosts in `scope`
    pub async fn list_host_errata(
        &self,
        scope: HostScope,
        cancel: CancellationToken,
    ) -> Result<RecordStream<Scoped<Errata>>> {
        self.list_host_children(HOST_ERRATA_PATH, scope, cancel)
            .await
    }

    async fn list_host_children<T>(
        &self,
        path: &'static str,
        scope: HostScope,
        cancel: CancellationToken,
    ) -> Result<RecordStream<Scoped<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let join = match scope {
            HostScope::Id(id) => JoinContext::id_only(id),
            HostScope::Name(name) => self.resolver.resolve_context(&name).await?,
            HostScope::All => return Ok(self.list_all_hosts_children(path, cancel)),
        };

        let request = host_child_request(path, join.host_id);
        Ok(self.list_collection(request, Some(join), cancel))
    }

    /// Walk the host listing and chain each host's child listing, in order
    fn list_all_hosts_children<T>(
        &self,
        path: &'static str,
        cancel: CancellationToken,
    ) -> RecordStream<Scoped<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        info!(path, "listing across all hosts");
        let hosts = self.list_hosts(HostQuery::thin(), cancel.clone());
        let client = self.clone();

        Box::pin(hosts.flat_map(move |host| -> RecordStream<Scoped<T>> {
            match host {
                Ok(host) => client.list_collection(
                    host_child_request(path, host.id),
                    Some(JoinContext::new(host.id, host.name)),
                    cancel.clone(),
                ),
                Err(e) => Box::pin(stream::once(async move { Err(e) })),
            }
        }))
    }
}

impl std::fmt::Debug for SatelliteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatelliteClient")
            .field("http", self.fetcher.client())
            .field("resolver", &self.resolver)
            .finish()
    }
}

fn host_child_request(path: &str, host_id: i64) -> CollectionRequest {
    CollectionRequest::new(path).path_param("id", host_id.to_string())
}
