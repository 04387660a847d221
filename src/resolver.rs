//! Host name resolution
//!
//! Host-scoped endpoints (`/api/hosts/{id}/packages`, `/api/hosts/{id}/errata`)
//! need the numeric host id. When a caller only knows the host name, a single
//! server-side search maps the name to an id first.

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::pagination::CollectionRequest;
use crate::sink::JoinContext;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do when a name search returns several hosts and none of them
/// carries exactly the requested name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Take the first host in server order
    #[default]
    FirstMatch,
    /// Fail with [`Error::AmbiguousName`]
    Strict,
}

/// Resolves host names to ids
pub struct HostResolver {
    fetcher: Arc<dyn PageFetcher>,
    policy: AmbiguityPolicy,
}

impl HostResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            policy: AmbiguityPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    /// Resolve a host name to its numeric id
    pub async fn resolve(&self, name: &str) -> Result<i64> {
        Ok(self.resolve_context(name).await?.host_id)
    }

    /// Resolve a host name to the join context used for its child records.
    ///
    /// The context carries the name as the caller gave it, so records match
    /// the lookup key even when the server stores a longer FQDN.
    pub async fn resolve_context(&self, name: &str) -> Result<JoinContext> {
        let request = search_request(name);
        let envelope = self.fetcher.fetch_page(&request, 1).await?;

        let candidates: Vec<Candidate> = envelope
            .results
            .iter()
            .filter_map(Candidate::from_value)
            .collect();

        let chosen = match candidates.as_slice() {
            [] => return Err(Error::not_found("host", name)),
            [only] => only,
            many => match many.iter().find(|c| c.name == name) {
                Some(exact) => exact,
                None if self.policy == AmbiguityPolicy::Strict => {
                    return Err(Error::AmbiguousName {
                        name: name.to_string(),
                        matches: many.len(),
                    });
                }
                None => {
                    let first = &many[0];
                    warn!(
                        name,
                        matches = many.len(),
                        chosen_id = first.id,
                        chosen_name = %first.name,
                        "host name is ambiguous, using first match"
                    );
                    first
                }
            },
        };

        debug!(name, host_id = chosen.id, "resolved host");
        Ok(JoinContext::new(chosen.id, name))
    }
}

impl std::fmt::Debug for HostResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostResolver")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Search for hosts by exact name, `thin` so only id and name come back
fn search_request(name: &str) -> CollectionRequest {
    CollectionRequest::new("/api/hosts")
        .query("search", format!("name=\"{name}\""))
        .query("thin", "true")
}

struct Candidate {
    id: i64,
    name: String,
}

impl Candidate {
    fn from_value(value: &JsonValue) -> Option<Self> {
        Some(Self {
            id: value.get("id")?.as_i64()?,
            name: value
                .get("name")
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}
