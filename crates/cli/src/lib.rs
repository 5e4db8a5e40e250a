// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clovercli`: command-line client for the Clover merchant API.

pub mod browser;
pub mod command;
pub mod config;
pub mod export;
pub mod login;
pub mod output;
pub mod period;
pub mod report;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

use std::io::Write;

use cloverapi::config::EnvOverrides;

use crate::config::{Cli, Command};
use crate::session::Context;

/// Execute a parsed command line, writing command output to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let ctx = Context::new(EnvOverrides::from_env(), cli.merchant, cli.output)?;
    dispatch(&ctx, &cli.command, out).await
}

pub async fn dispatch(ctx: &Context, command: &Command, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::Auth { command } => command::auth::run(ctx, command, out).await,
        Command::Merchant { command } => command::merchant::run(ctx, command, out).await,
        Command::Payments { command } => command::payments::run(ctx, command, out).await,
        Command::Orders { command } => command::orders::run(ctx, command, out).await,
        Command::Items { command } => command::items::run(ctx, command, out).await,
        Command::Customers { command } => command::customers::run(ctx, command, out).await,
        Command::Discounts { command } => command::discounts::run(ctx, command, out).await,
        Command::Employees { command } => command::employees::run(ctx, command, out).await,
        Command::Reports { command } => command::reports::run(ctx, command, out).await,
        Command::Api(args) => command::api::run(ctx, args, out).await,
    }
}
