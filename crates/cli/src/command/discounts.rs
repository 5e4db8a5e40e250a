// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::Subcommand;
use cloverapi::models::Discount;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{decode, decode_one, ListArgs, Listing};
use crate::output::{money, print_list, print_record, OutputFormat, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 100;

/// Stored percentages carry four implied decimal places.
const PERCENT_SCALE: f64 = 10_000.0;

#[derive(Debug, Subcommand)]
pub enum DiscountsCommand {
    /// List discounts.
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one discount.
    Get { id: String },
    /// Create a percentage or fixed-amount discount.
    Create {
        #[arg(long)]
        name: String,
        /// Percent off, e.g. `10` or `12.5`.
        #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
        percentage: Option<f64>,
        /// Amount off in cents.
        #[arg(long)]
        amount: Option<i64>,
    },
    /// Delete a discount.
    Delete {
        id: String,
        /// Skip the lookup that names the discount before deleting it.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(ctx: &Context, cmd: &DiscountsCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        DiscountsCommand::List { list } => {
            let raw = Listing::new("/v3/merchants/{mId}/discounts", list, PAGE_DEFAULT).fetch(ctx, &client).await?;
            let discounts: Vec<Discount> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "NAME", "TYPE", "VALUE"]);
            for d in &discounts {
                let (kind, value) = describe(d);
                table.push(vec![d.id.clone(), d.name.clone(), kind.to_owned(), value]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        DiscountsCommand::Get { id } => {
            let raw = client.get(&format!("/v3/merchants/{{mId}}/discounts/{id}"), &[]).await?;
            print_discount(out, ctx.format, &raw)?;
        }
        DiscountsCommand::Create { name, percentage, amount } => {
            let body = create_body(name, *percentage, *amount)?;
            let raw = client.post("/v3/merchants/{mId}/discounts", &body).await?;
            info!(name = %name, "discount created");
            print_discount(out, ctx.format, &raw)?;
        }
        DiscountsCommand::Delete { id, force } => {
            let path = format!("/v3/merchants/{{mId}}/discounts/{id}");
            if !force {
                let d: Discount = decode_one(&client.get(&path, &[]).await?)?;
                warn!(discount = %id, name = %d.name, "deleting discount");
            }
            client.delete(&path).await?;
            info!(discount = %id, "discount deleted");
            if ctx.format == OutputFormat::Table {
                writeln!(out, "Deleted discount {id}.")?;
            }
        }
    }
    Ok(())
}

fn create_body(name: &str, percentage: Option<f64>, amount: Option<i64>) -> anyhow::Result<Value> {
    match (percentage, amount) {
        (Some(pct), None) => {
            anyhow::ensure!((0.0..=100.0).contains(&pct), "--percentage must be between 0 and 100");
            Ok(json!({ "name": name, "percentage": (pct * PERCENT_SCALE).round() as i64 }))
        }
        (None, Some(cents)) => Ok(json!({ "name": name, "amount": cents })),
        _ => anyhow::bail!("pass exactly one of --percentage or --amount"),
    }
}

fn describe(d: &Discount) -> (&'static str, String) {
    match (d.percentage, d.amount) {
        (Some(p), _) => ("Percentage", format!("{}%", p as f64 / PERCENT_SCALE)),
        (None, Some(a)) => ("Fixed", money(a)),
        (None, None) => ("Fixed", String::new()),
    }
}

fn print_discount(out: &mut dyn Write, format: OutputFormat, raw: &Value) -> anyhow::Result<()> {
    let d: Discount = decode_one(raw)?;
    let (kind, value) = describe(&d);
    print_record(
        out,
        format,
        raw,
        &d.id,
        &[("ID", d.id.clone()), ("Name", d.name.clone()), ("Type", kind.to_owned()), ("Value", value)],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "discounts_tests.rs"]
mod tests;
