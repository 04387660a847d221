// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # satellite-client
//!
//! Streaming client for the paginated Red Hat Satellite / Foreman REST API (v2).
//!
//! ## Features
//!
//! - **Lazy listings**: hosts, host packages and host errata as `futures::Stream`s
//! - **Forgiving pagination**: the `page` cursor may arrive as integer, float or string
//! - **Cancellation**: listings stop between records when a `CancellationToken` fires
//! - **Join context**: child records carry their parent host's id and name
//! - **Name resolution**: host-scoped listings accept a host name instead of an id
//! - **NVRA parsing**: split `name-version-release.arch` package identifiers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use satellite_client::{HostScope, SatelliteClient, SatelliteConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> satellite_client::Result<()> {
//!     let config = SatelliteConfig::load(Some("satellite.yaml".as_ref()))?;
//!     let client = SatelliteClient::from_config(config)?;
//!
//!     let mut packages = client
//!         .list_host_packages(HostScope::Name("web01".into()), CancellationToken::new())
//!         .await?;
//!     while let Some(package) = packages.next().await {
//!         let package = package?;
//!         println!("{} on {:?}", package.record.nvra, package.join);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SatelliteClient                        │
//! │  list_hosts   get_host   list_host_packages   list_host_errata│
//! └──────────────────────────────────────────────────────────────┘
//!          │                   │                     │
//! ┌────────┴──────┬────────────┴─────┬───────────────┴──────────┐
//! │  HostResolver │    Paginator     │      StreamingSink       │
//! │  name -> id   │  page cursor     │  record + JoinContext    │
//! └───────────────┴────────┬─────────┴──────────────────────────┘
//!                          │
//!                ┌─────────┴─────────┐
//!                │  ResourceFetcher  │  one GET per page
//!                │  HttpClient       │  basic auth, rate limit
//!                └───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Basic authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Endpoint path templates
pub mod template;

/// Page fetching
pub mod fetch;

/// Page cursor handling and the pagination driver
pub mod pagination;

/// Join context for host-scoped records
pub mod sink;

/// Host name resolution
pub mod resolver;

/// NVRA package identifier parsing
pub mod nvra;

/// Resource records
pub mod models;

/// Connection configuration
pub mod config;

/// Client facade
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use client::{HostQuery, HostScope, SatelliteClient};
pub use config::SatelliteConfig;
pub use fetch::{PageFetcher, ResourceFetcher};
pub use models::{Errata, Host, HostPackage, SatelliteTime};
pub use nvra::Nvra;
pub use pagination::{CollectionRequest, PageCursor, PageEnvelope, Paginator, RecordStream};
pub use resolver::{AmbiguityPolicy, HostResolver};
pub use sink::{JoinContext, Scoped, StreamingSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
