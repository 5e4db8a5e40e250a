// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk retrieval from list endpoints.
//!
//! A requested date range is split into windows no wider than the API's
//! maximum filterable span; each window is paged at a fixed size until a
//! short page signals the end. Results keep window order, then page order,
//! then server order.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

pub const DAY_MS: u64 = 86_400_000;

/// Widest span the API accepts in one date-filtered query.
pub const MAX_WINDOW_MS: u64 = 90 * DAY_MS;

pub const PAGE_SIZE: usize = 1000;

/// Cap on returned records when the caller gives none.
pub const DEFAULT_LIMIT_TOTAL: usize = 10_000;

/// Courtesy pause between consecutive pages of one window.
pub const PAGE_PAUSE: Duration = Duration::from_millis(250);

/// Field the date filters compare against.
pub const CREATED_TIME: &str = "createdTime";

/// Anything that can return one page of a list endpoint.
pub trait PageSource: Send + Sync {
    fn fetch_page(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> impl Future<Output = Result<Vec<Value>, ClientError>> + Send;
}

/// Half-open `[from_ms, to_ms)` interval for one date-filtered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from_ms: u64,
    pub to_ms: u64,
}

impl Window {
    pub fn span_ms(&self) -> u64 {
        self.to_ms - self.from_ms
    }
}

/// Split `[from_ms, to_ms)` into contiguous windows of at most `max_span_ms`.
///
/// Returns no windows when the range is empty.
pub fn windows(from_ms: u64, to_ms: u64, max_span_ms: u64) -> Vec<Window> {
    let span = max_span_ms.max(1);
    let mut out = Vec::new();
    let mut start = from_ms;
    while start < to_ms {
        let end = start.saturating_add(span).min(to_ms);
        out.push(Window { from_ms: start, to_ms: end });
        start = end;
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub from_ms: Option<u64>,
    pub to_ms: Option<u64>,
    /// Defaults to [`DEFAULT_LIMIT_TOTAL`].
    pub limit_total: Option<usize>,
    /// Extra query parameters sent with every page (e.g. `expand`).
    pub query: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn range(from_ms: u64, to_ms: u64) -> Self {
        Self { from_ms: Some(from_ms), to_ms: Some(to_ms), ..Self::default() }
    }

    pub fn with_limit(mut self, limit_total: usize) -> Self {
        self.limit_total = Some(limit_total);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

pub struct BulkFetcher<'a, S> {
    source: &'a S,
    pub page_size: usize,
    pub max_window_ms: u64,
    pub page_pause: Duration,
}

impl<'a, S: PageSource> BulkFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, page_size: PAGE_SIZE, max_window_ms: MAX_WINDOW_MS, page_pause: PAGE_PAUSE }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_window(mut self, max_window_ms: u64) -> Self {
        self.max_window_ms = max_window_ms;
        self
    }

    pub fn with_page_pause(mut self, page_pause: Duration) -> Self {
        self.page_pause = page_pause;
        self
    }

    /// Date bounds for each query, earliest first.
    fn ranges(&self, opts: &FetchOptions) -> Vec<(Option<u64>, Option<u64>)> {
        match (opts.from_ms, opts.to_ms) {
            (Some(from), Some(to)) => {
                let chunks = windows(from, to, self.max_window_ms);
                if chunks.len() > 1 {
                    warn!(
                        windows = chunks.len(),
                        max_days = self.max_window_ms / DAY_MS,
                        "date range exceeds the API maximum; fetching in chunks"
                    );
                }
                chunks.into_iter().map(|w| (Some(w.from_ms), Some(w.to_ms))).collect()
            }
            (from, to) => vec![(from, to)],
        }
    }

    /// Fetch every record of `path` in the requested range, up to the limit.
    ///
    /// Any error aborts the whole call; no partial result is returned.
    pub async fn fetch_all(&self, path: &str, opts: &FetchOptions) -> Result<Vec<Value>, ClientError> {
        let limit = opts.limit_total.unwrap_or(DEFAULT_LIMIT_TOTAL);
        let mut out = Vec::new();
        if limit == 0 {
            return Ok(out);
        }

        for (from, to) in self.ranges(opts) {
            let mut offset = 0usize;
            loop {
                if offset > 0 && !self.page_pause.is_zero() {
                    tokio::time::sleep(self.page_pause).await;
                }

                let mut query = opts.query.clone();
                if let Some(from) = from {
                    query.push(("filter".into(), format!("{CREATED_TIME}>={from}")));
                }
                if let Some(to) = to {
                    query.push(("filter".into(), format!("{CREATED_TIME}<{to}")));
                }
                query.push(("limit".into(), self.page_size.to_string()));
                query.push(("offset".into(), offset.to_string()));

                let page = self.source.fetch_page(path, &query).await?;
                let count = page.len();
                debug!(path, offset, count, from, to, "fetched page");

                let remaining = limit - out.len();
                if count >= remaining {
                    out.extend(page.into_iter().take(remaining));
                    return Ok(out);
                }
                out.extend(page);

                if count < self.page_size {
                    break;
                }
                offset += self.page_size;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
