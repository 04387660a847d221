//! Pagination module
//!
//! Drives the Satellite API's one-indexed `page` / `per_page` / `total`
//! pagination and turns a paginated collection into a lazy record stream.
//!
//! # Overview
//!
//! - [`PageCursor`] models the `page` field, which the API returns as an
//!   integer, a float or a numeric string depending on the request.
//! - [`PageEnvelope`] is the decoded wrapper around each page of results.
//! - [`Paginator`] is the state machine that fetches pages one at a time,
//!   honours cancellation and yields records in order.

mod cursor;
mod driver;
mod types;

pub use cursor::PageCursor;
pub use driver::{DriverState, ListingOutcome, Paginator, RecordStream};
pub use types::{next_page, CollectionRequest, ListingStats, NextPage, PageEnvelope, Sort};
