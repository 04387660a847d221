//! Pagination driver
//!
//! [`Paginator`] walks a collection one page at a time and hands records to
//! the consumer in server order. Only one page is buffered at any moment,
//! the next page is requested only once the buffer is drained, and the
//! cancellation token is checked before every record and before every
//! fetch. A fetch already in flight runs to completion; a token fired
//! meanwhile is seen before the page's first record is released.

use super::types::{next_page, CollectionRequest, ListingStats, NextPage};
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::JsonValue;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lazily produced records of a listing
pub type RecordStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// How a listing ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Every page was retrieved and streamed
    Exhausted,
    /// The cancellation token fired
    Cancelled,
    /// A fetch or decode error was returned to the consumer
    Failed,
}

/// Where the driver is in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Page `page` has to be fetched next
    Pending { page: u32 },
    /// Records of `page` are being handed out; `next` was decided on arrival
    Streaming { page: u32, next: NextPage },
    /// Terminal
    Done(ListingOutcome),
}

/// Streams the records of a paginated collection
pub struct Paginator<T> {
    fetcher: Arc<dyn PageFetcher>,
    request: CollectionRequest,
    cancel: CancellationToken,
    state: DriverState,
    buffer: VecDeque<JsonValue>,
    stats: ListingStats,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Paginator<T> {
    /// Create a paginator starting at page 1
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        request: CollectionRequest,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            request,
            cancel,
            state: DriverState::Pending { page: 1 },
            buffer: VecDeque::new(),
            stats: ListingStats::default(),
            _record: PhantomData,
        }
    }

    /// Current state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Pages fetched and records emitted so far
    pub fn stats(&self) -> ListingStats {
        self.stats
    }

    /// The outcome, once the listing has ended
    pub fn outcome(&self) -> Option<ListingOutcome> {
        match self.state {
            DriverState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Produce the next record.
    ///
    /// Returns `None` once the collection is exhausted or the listing was
    /// cancelled. An error is returned at most once and ends the listing.
    pub async fn next_record(&mut self) -> Option<Result<T>> {
        loop {
            match self.state {
                DriverState::Done(_) => return None,
                _ if self.cancel.is_cancelled() => {
                    self.finish(ListingOutcome::Cancelled);
                    return None;
                }
                DriverState::Streaming { page, next } => {
                    if let Some(raw) = self.buffer.pop_front() {
                        return Some(self.decode(raw, page));
                    }
                    match next {
                        NextPage::Continue(page) => self.state = DriverState::Pending { page },
                        NextPage::Done => {
                            self.finish(ListingOutcome::Exhausted);
                            return None;
                        }
                    }
                }
                DriverState::Pending { page } => {
                    if let Err(e) = self.fetch(page).await {
                        self.finish(ListingOutcome::Failed);
                        return Some(Err(e));
                    }
                }
            }
        }
    }

    /// Turn the paginator into a record stream
    pub fn into_stream(self) -> RecordStream<T>
    where
        T: Send + 'static,
    {
        Box::pin(futures::stream::unfold(self, |mut paginator| async move {
            paginator
                .next_record()
                .await
                .map(|record| (record, paginator))
        }))
    }

    async fn fetch(&mut self, page: u32) -> Result<()> {
        let envelope = self.fetcher.fetch_page(&self.request, page).await?;
        self.stats.add_page();

        // The cursor is checked before any record of the page is released
        let mut next = next_page(&envelope, page)?;

        // A non-numeric cursor normalizes to 0, so `per_page * 0 < total`
        // never turns false; an empty page is the only sign the server is done
        if next.is_continue() && envelope.results.is_empty() {
            warn!(
                path = %self.request.path,
                page,
                total = envelope.total,
                "empty page before reaching total, stopping"
            );
            next = NextPage::Done;
        }

        debug!(
            path = %self.request.path,
            page,
            records = envelope.results.len(),
            total = envelope.total,
            "page received"
        );

        self.buffer = envelope.results.into();
        self.state = DriverState::Streaming { page, next };
        Ok(())
    }

    fn decode(&mut self, raw: JsonValue, page: u32) -> Result<T> {
        match serde_json::from_value(raw) {
            Ok(record) => {
                self.stats.add_record();
                Ok(record)
            }
            Err(e) => {
                self.finish(ListingOutcome::Failed);
                Err(Error::decode(format!("record on page {page}: {e}")))
            }
        }
    }

    fn finish(&mut self, outcome: ListingOutcome) {
        self.buffer.clear();
        self.state = DriverState::Done(outcome);

        match outcome {
            ListingOutcome::Cancelled => info!(
                path = %self.request.path,
                pages = self.stats.pages_fetched,
                records = self.stats.records_emitted,
                "listing cancelled"
            ),
            _ => debug!(
                path = %self.request.path,
                pages = self.stats.pages_fetched,
                records = self.stats.records_emitted,
                ?outcome,
                "listing finished"
            ),
        }
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("request", &self.request)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
