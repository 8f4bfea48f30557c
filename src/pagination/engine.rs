//! Streaming page loop
//!
//! One call to [`paginate`] walks through these states:
//!
//! ```text
//! INIT → FETCHING → (EMITTING → FETCHING)* → DONE
//!             └──────────→ FAILED (error yielded, stream ends)
//! ```
//!
//! There is no page cap: a strategy that always continues paginates forever.

use super::strategy::ContinuationStrategy;
use crate::error::Result;
use crate::http::PageFetcher;
use crate::types::{JsonValue, Record, RecordStream, RequestParams};
use futures::stream;
use std::collections::VecDeque;
use tracing::debug;

/// Mutable loop state, private to one stream
struct PageLoop<'a, F: ?Sized, S: ?Sized> {
    fetcher: &'a F,
    strategy: &'a S,
    endpoint: String,
    current_params: RequestParams,
    page_count: u64,
    buffered: VecDeque<Record>,
    /// Metadata of the last page, awaiting the continuation decision
    pending: Option<JsonValue>,
    done: bool,
}

impl<F, S> PageLoop<'_, F, S>
where
    F: PageFetcher + ?Sized,
    S: ContinuationStrategy + ?Sized,
{
    async fn fetch_page(&mut self) -> Result<()> {
        let payload = self
            .fetcher
            .get(Some(&self.endpoint), Some(&self.current_params))
            .await?;
        let page = self.strategy.page_result(&payload);

        debug!(
            endpoint = %self.endpoint,
            page = self.page_count + 1,
            records = page.records.len(),
            "Fetched page"
        );

        self.buffered.extend(page.records);
        self.pending = Some(page.metadata);
        Ok(())
    }

    fn decide(&mut self, metadata: &JsonValue) -> Result<()> {
        self.page_count += 1;

        if !self.strategy.should_continue(metadata, self.page_count) {
            debug!(endpoint = %self.endpoint, pages = self.page_count, "Pagination complete");
            self.done = true;
            return Ok(());
        }

        match self
            .strategy
            .next_page_params(metadata, &self.current_params, self.page_count)?
        {
            Some(next) if !next.is_empty() => self.current_params = next,
            _ => {
                debug!(endpoint = %self.endpoint, pages = self.page_count, "No next page parameters");
                self.done = true;
            }
        }
        Ok(())
    }
}

/// Stream every record of an endpoint, page by page.
///
/// `endpoint` and `params` fall back to the fetcher's defaults. Nothing is
/// requested until the stream is first polled. An unrecovered error is
/// yielded once and ends the stream; records already yielded stay delivered.
pub fn paginate<'a, F, S>(
    fetcher: &'a F,
    strategy: &'a S,
    endpoint: Option<&str>,
    params: Option<RequestParams>,
) -> RecordStream<'a>
where
    F: PageFetcher + ?Sized,
    S: ContinuationStrategy + ?Sized,
{
    let state = PageLoop {
        fetcher,
        strategy,
        endpoint: endpoint.map_or_else(|| fetcher.default_endpoint().to_string(), str::to_string),
        current_params: params.unwrap_or_else(|| fetcher.default_params()),
        page_count: 0,
        buffered: VecDeque::new(),
        pending: None,
        done: false,
    };

    Box::pin(stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.buffered.pop_front() {
                return Ok(Some((record, state)));
            }
            if let Some(metadata) = state.pending.take() {
                state.decide(&metadata)?;
                continue;
            }
            if state.done {
                return Ok(None);
            }
            state.fetch_page().await?;
        }
    }))
}
