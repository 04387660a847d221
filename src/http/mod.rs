//! HTTP transport
//!
//! Provides the HTTP client used to talk to the Satellite REST API.
//!
//! # Features
//!
//! - **API headers**: Every request asks for `application/json,version=2`
//! - **Default scope**: Organisation and location sent as default query parameters
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Retries**: Optional, with constant, linear or exponential backoff
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, ACCEPT_API_V2,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
