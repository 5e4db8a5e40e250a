// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};

use crate::command::api::ApiArgs;
use crate::command::auth::AuthCommand;
use crate::command::customers::CustomersCommand;
use crate::command::discounts::DiscountsCommand;
use crate::command::employees::EmployeesCommand;
use crate::command::items::ItemsCommand;
use crate::command::merchant::MerchantCommand;
use crate::command::orders::OrdersCommand;
use crate::command::payments::PaymentsCommand;
use crate::command::reports::ReportsCommand;
use crate::output::OutputFormat;

/// Command-line client for the Clover merchant API.
#[derive(Debug, Parser)]
#[command(name = "clovercli", version, about)]
pub struct Cli {
    /// Merchant to act on (defaults to the stored default merchant).
    #[arg(long, short = 'm', global = true, env = "CLOVER_MERCHANT_ID")]
    pub merchant: Option<String>,

    /// Output format (table, json, quiet).
    #[arg(long, short = 'o', global = true, env = "CLOVER_OUTPUT", default_value = "table")]
    pub output: OutputFormat,

    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive.
    #[arg(long, global = true, env = "CLOVER_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log format (text or json). Logs go to stderr.
    #[arg(long, global = true, env = "CLOVER_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in, inspect, and manage stored credentials.
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Merchant account details.
    Merchant {
        #[command(subcommand)]
        command: MerchantCommand,
    },
    /// List, inspect, and refund payments.
    Payments {
        #[command(subcommand)]
        command: PaymentsCommand,
    },
    /// List, inspect, create, and delete orders.
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },
    /// Inventory items and stock levels.
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },
    /// Customer records.
    Customers {
        #[command(subcommand)]
        command: CustomersCommand,
    },
    /// Percentage and fixed-amount discounts.
    Discounts {
        #[command(subcommand)]
        command: DiscountsCommand,
    },
    /// Employee records.
    Employees {
        #[command(subcommand)]
        command: EmployeesCommand,
    },
    /// Sales reports built from payment data.
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },
    /// Raw authenticated API request.
    Api(ApiArgs),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
