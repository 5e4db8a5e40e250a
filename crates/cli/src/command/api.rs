// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use anyhow::Context as _;
use clap::Args;
use reqwest::Method;
use serde_json::Value;

use crate::output::print_json;
use crate::session::Context;

/// Raw request through the authenticated transport. `{mId}` in the path is
/// replaced with the active merchant.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// HTTP method (get, post, put, delete).
    pub method: String,

    /// Path such as `/v3/merchants/{mId}/tenders`.
    pub path: String,

    /// JSON request body.
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Query parameter as key=value; repeatable.
    #[arg(long = "param", short = 'p', value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

pub async fn run(ctx: &Context, args: &ApiArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method {:?}", args.method))?;
    let body: Option<Value> = args
        .data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--data is not valid JSON")?;

    let client = ctx.client()?;
    let value = client.request(method, &args.path, &args.params, body.as_ref()).await?;
    if !value.is_null() {
        print_json(out, &value)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
