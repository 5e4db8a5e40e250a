// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use anyhow::Context as _;
use clap::{Args, Subcommand};
use cloverapi::config::Region;
use cloverapi::credential::store::CredentialStore;
use cloverapi::credential::{epoch_ms, CredentialRecord};
use cloverapi::AuthError;
use serde_json::json;
use tracing::info;

use crate::browser;
use crate::login::{self, LoginParams, CALLBACK_TIMEOUT, DEFAULT_PORT};
use crate::output::{print_json, print_list, print_record, timestamp, OutputFormat, Table};
use crate::session::Context;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authorize in the browser and store the merchant's tokens.
    Login(LoginArgs),
    /// Show the active merchant and token state.
    Status,
    /// Refresh the active merchant's access token now.
    Refresh,
    /// Forget stored credentials.
    Logout {
        /// Merchant to forget; defaults to the active one.
        merchant: Option<String>,
        /// Forget every stored merchant.
        #[arg(long, conflicts_with = "merchant")]
        all: bool,
    },
    /// List stored merchants.
    List,
    /// Make a stored merchant the default.
    Use { merchant: String },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// App ID (defaults to CLOVER_CLIENT_ID).
    #[arg(long)]
    pub client_id: Option<String>,

    /// App secret (defaults to CLOVER_CLIENT_SECRET).
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Region of the merchant account: us, eu, la, or sandbox.
    #[arg(long)]
    pub region: Option<Region>,

    /// Local port for the OAuth redirect.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Print the authorize URL without opening a browser.
    #[arg(long)]
    pub no_browser: bool,
}

pub async fn run(ctx: &Context, cmd: &AuthCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    match cmd {
        AuthCommand::Login(args) => login(ctx, args, out).await,
        AuthCommand::Status => status(ctx, out),
        AuthCommand::Refresh => refresh(ctx, out).await,
        AuthCommand::Logout { merchant, all } => logout(ctx, merchant.as_deref(), *all, out),
        AuthCommand::List => list(ctx, out),
        AuthCommand::Use { merchant } => use_merchant(ctx, merchant, out),
    }
}

async fn login(ctx: &Context, args: &LoginArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let client_id = args
        .client_id
        .clone()
        .or_else(|| ctx.env.client_id.clone())
        .context("missing app ID: pass --client-id or set CLOVER_CLIENT_ID")?;
    let client_secret = args
        .client_secret
        .clone()
        .or_else(|| ctx.env.client_secret.clone())
        .context("missing app secret: pass --client-secret or set CLOVER_CLIENT_SECRET")?;
    let region = args.region.or(ctx.env.region).or(ctx.store()?.region()).unwrap_or_default();

    let params = LoginParams {
        client_id,
        client_secret,
        region,
        port: args.port,
        api_override: ctx.env.api_url.clone(),
        timeout: CALLBACK_TIMEOUT,
    };
    let outcome = login::login(&params, &ctx.http, |url| {
        eprintln!("Open this URL to authorize clovercli:\n\n  {url}\n");
        if !args.no_browser {
            browser::open(url.as_str());
        }
    })
    .await?;

    let mut store = ctx.store()?;
    store.put(&outcome.merchant_id, outcome.record)?;
    info!(merchant = %outcome.merchant_id, path = %store.path().display(), "credentials saved");
    match ctx.format {
        OutputFormat::Json => print_json(out, &json!({ "merchantId": outcome.merchant_id, "region": region }))?,
        OutputFormat::Quiet => writeln!(out, "{}", outcome.merchant_id)?,
        OutputFormat::Table => writeln!(out, "Logged in to merchant {} ({region}).", outcome.merchant_id)?,
    }
    Ok(())
}

fn expiry(record: &CredentialRecord, now_ms: u64) -> String {
    match record.expires_at {
        Some(at) if at <= now_ms => "EXPIRED".to_owned(),
        Some(at) => timestamp(i64::try_from(at).unwrap_or(i64::MAX)),
        None => "unknown".to_owned(),
    }
}

fn status(ctx: &Context, out: &mut dyn Write) -> anyhow::Result<()> {
    if ctx.env.access_token.is_some() {
        let merchant = ctx.merchant.clone().or_else(|| ctx.env.merchant_id.clone()).unwrap_or_default();
        let raw = json!({ "loggedIn": true, "source": "environment", "merchantId": merchant });
        print_record(
            out,
            ctx.format,
            &raw,
            &merchant,
            &[("Merchant", merchant.clone()), ("Source", "CLOVER_ACCESS_TOKEN".to_owned())],
        )?;
        return Ok(());
    }

    let store = ctx.store()?;
    let resolved = store
        .resolve_merchant(ctx.merchant.as_deref())
        .and_then(|m| store.get(Some(&m)).map(|r| (m, r.clone())));
    let Some((merchant, record)) = resolved else {
        match ctx.format {
            OutputFormat::Json => print_json(out, &json!({ "loggedIn": false }))?,
            OutputFormat::Quiet => {}
            OutputFormat::Table => writeln!(out, "Not logged in.")?,
        }
        return Ok(());
    };

    let now = epoch_ms();
    let raw = json!({
        "loggedIn": true,
        "source": "store",
        "merchantId": merchant,
        "region": record.region,
        "expiresAt": record.expires_at,
        "expired": record.expires_at.is_some_and(|at| at <= now),
        "hasRefreshToken": record.refresh_token.is_some(),
        "default": store.default_merchant() == Some(merchant.as_str()),
    });
    print_record(
        out,
        ctx.format,
        &raw,
        &merchant,
        &[
            ("Merchant", merchant.clone()),
            ("Region", record.region.to_string()),
            ("Expires", expiry(&record, now)),
            ("Refresh token", if record.refresh_token.is_some() { "yes" } else { "no" }.to_owned()),
        ],
    )?;
    Ok(())
}

/// The stored merchant a command applies to.
fn active_merchant(ctx: &Context, store: &CredentialStore) -> anyhow::Result<String> {
    let merchant =
        store.resolve_merchant(ctx.merchant.as_deref()).ok_or(AuthError::NotAuthenticated { merchant: None })?;
    if !store.contains(&merchant) {
        return Err(AuthError::NotAuthenticated { merchant: Some(merchant) }.into());
    }
    Ok(merchant)
}

async fn refresh(ctx: &Context, out: &mut dyn Write) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let merchant = active_merchant(ctx, &store)?;
    let manager = ctx.token_manager(store);
    manager.refresh(&merchant).await?;

    let store = manager.into_store();
    let expires = store.get(Some(&merchant)).map(|r| expiry(r, epoch_ms())).unwrap_or_default();
    match ctx.format {
        OutputFormat::Json => print_json(out, &json!({ "merchantId": merchant, "refreshed": true }))?,
        OutputFormat::Quiet => writeln!(out, "{merchant}")?,
        OutputFormat::Table => writeln!(out, "Refreshed token for merchant {merchant} (expires {expires}).")?,
    }
    Ok(())
}

fn logout(ctx: &Context, merchant: Option<&str>, all: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    let targets = if all {
        store.list()
    } else {
        let merchant = merchant
            .map(str::to_owned)
            .or_else(|| store.resolve_merchant(ctx.merchant.as_deref()))
            .ok_or(AuthError::NotAuthenticated { merchant: None })?;
        vec![merchant]
    };

    for merchant in &targets {
        if !store.remove(merchant)? {
            anyhow::bail!("no credentials stored for merchant {merchant}");
        }
        info!(merchant = %merchant, "credentials removed");
        if ctx.format == OutputFormat::Table {
            writeln!(out, "Logged out of merchant {merchant}.")?;
        }
    }
    if all && targets.is_empty() && ctx.format == OutputFormat::Table {
        writeln!(out, "No stored merchants.")?;
    }
    Ok(())
}

fn list(ctx: &Context, out: &mut dyn Write) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let now = epoch_ms();
    let mut raw = Vec::new();
    let mut table = Table::new(vec!["MERCHANT", "REGION", "DEFAULT", "EXPIRES"]);
    for merchant in store.list() {
        let Some(record) = store.get(Some(&merchant)) else { continue };
        let is_default = store.default_merchant() == Some(merchant.as_str());
        raw.push(json!({
            "merchantId": merchant,
            "region": record.region,
            "default": is_default,
            "expiresAt": record.expires_at,
        }));
        table.push(vec![
            merchant.clone(),
            record.region.to_string(),
            if is_default { "*" } else { "" }.to_owned(),
            expiry(record, now),
        ]);
    }
    print_list(out, ctx.format, &raw, &table)?;
    Ok(())
}

fn use_merchant(ctx: &Context, merchant: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    if !store.contains(merchant) {
        return Err(AuthError::NotAuthenticated { merchant: Some(merchant.to_owned()) }.into());
    }
    store.set_default(merchant)?;
    match ctx.format {
        OutputFormat::Json => print_json(out, &json!({ "default": merchant }))?,
        OutputFormat::Quiet => writeln!(out, "{merchant}")?,
        OutputFormat::Table => writeln!(out, "Default merchant is now {merchant}.")?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
