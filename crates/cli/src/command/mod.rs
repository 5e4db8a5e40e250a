// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers. Each one writes its result to `out` in the format
//! chosen by `--output`; diagnostics go through `tracing` to stderr.

pub mod api;
pub mod auth;
pub mod customers;
pub mod discounts;
pub mod employees;
pub mod items;
pub mod merchant;
pub mod orders;
pub mod payments;
pub mod reports;

use anyhow::Context as _;
use clap::Args;
use cloverapi::fetch::{FetchOptions, DEFAULT_LIMIT_TOTAL};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::period::{today, DateRange};
use crate::session::{Client, Context};

/// Paging flags shared by every `list` subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Fetch every page instead of one.
    #[arg(long)]
    pub all: bool,

    /// Page size, or the total record cap with --all or a date range
    /// (default 10000).
    #[arg(long)]
    pub limit: Option<usize>,

    /// Records to skip. Single-page listings only.
    #[arg(long)]
    pub offset: Option<usize>,
}

/// Creation-date filter for list commands.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD, UTC); defaults to today with --from.
    #[arg(long)]
    pub to: Option<String>,
}

impl RangeArgs {
    /// Half-open epoch-ms range, or `None` when no date was given.
    pub fn resolve(&self) -> anyhow::Result<Option<(u64, u64)>> {
        if self.from.is_none() && self.to.is_none() {
            return Ok(None);
        }
        let range = DateRange::from_args(self.from.as_deref(), self.to.as_deref(), None, today())?;
        Ok(Some(range.to_ms()))
    }
}

/// One listing request.
pub struct Listing<'a> {
    pub path: &'a str,
    pub args: &'a ListArgs,
    pub range: Option<(u64, u64)>,
    /// Page size when `--limit` is absent.
    pub page_default: usize,
    pub query: Vec<(String, String)>,
}

impl<'a> Listing<'a> {
    pub fn new(path: &'a str, args: &'a ListArgs, page_default: usize) -> Self {
        Self { path, args, range: None, page_default, query: Vec::new() }
    }

    pub fn range(mut self, range: Option<(u64, u64)>) -> Self {
        self.range = range;
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Raw records. A single page unless `--all` or a date range asks for
    /// the bulk fetcher, which always starts at the first record.
    pub async fn fetch(self, ctx: &Context, client: &Client) -> anyhow::Result<Vec<Value>> {
        if !self.args.all && self.range.is_none() {
            let limit = self.args.limit.unwrap_or(self.page_default);
            let offset = self.args.offset.unwrap_or(0);
            let mut query = self.query;
            query.push(("limit".into(), limit.to_string()));
            query.push(("offset".into(), offset.to_string()));
            debug!(path = self.path, limit, offset, "single page listing");
            let page = client.get(self.path, &query).await?;
            return Ok(elements(page));
        }

        anyhow::ensure!(
            self.args.offset.is_none(),
            "--offset applies to single-page listings; it cannot be combined with --all or --from/--to"
        );
        let limit_total = self.args.limit.unwrap_or(DEFAULT_LIMIT_TOTAL);
        let mut opts = FetchOptions { query: self.query, ..FetchOptions::default() }.with_limit(limit_total);
        if let Some((from_ms, to_ms)) = self.range {
            opts.from_ms = Some(from_ms);
            opts.to_ms = Some(to_ms);
        }
        Ok(ctx.fetcher(client).fetch_all(self.path, &opts).await?)
    }
}

/// `elements` of a list envelope, or nothing.
pub fn elements(page: Value) -> Vec<Value> {
    match page {
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Decode raw records into a typed model.
pub fn decode<T: DeserializeOwned>(raw: &[Value]) -> anyhow::Result<Vec<T>> {
    raw.iter().map(decode_one::<T>).collect()
}

pub fn decode_one<T: DeserializeOwned>(raw: &Value) -> anyhow::Result<T> {
    serde_json::from_value(raw.clone()).context("unexpected record shape")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
