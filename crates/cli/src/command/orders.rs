// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::{Args, Subcommand};
use cloverapi::models::{LineItem, Order};
use serde_json::{json, Value};
use tracing::info;

use super::{decode, decode_one, ListArgs, Listing, RangeArgs};
use crate::output::{money_opt, print_list, print_record, timestamp_opt, OutputFormat, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 20;

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List orders.
    List {
        #[command(flatten)]
        list: ListArgs,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Show one order with its line items.
    Get {
        id: String,
        /// Related collections to expand.
        #[arg(long, default_value = "lineItems")]
        expand: String,
    },
    /// Create an open order.
    Create(CreateOrderArgs),
    /// Add an inventory item to an order.
    AddItem {
        order_id: String,
        #[arg(long)]
        item_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change an order's note.
    Update {
        id: String,
        #[arg(long)]
        note: String,
    },
    /// Delete an order.
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct CreateOrderArgs {
    /// Total in cents.
    #[arg(long)]
    pub total: Option<i64>,

    #[arg(long)]
    pub note: Option<String>,
}

pub async fn run(ctx: &Context, cmd: &OrdersCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        OrdersCommand::List { list, range } => {
            let raw = Listing::new("/v3/merchants/{mId}/orders", list, PAGE_DEFAULT)
                .range(range.resolve()?)
                .fetch(ctx, &client)
                .await?;
            let orders: Vec<Order> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "TOTAL", "STATE", "NOTE", "CREATED"]);
            for o in &orders {
                table.push(vec![
                    o.id.clone(),
                    money_opt(o.total),
                    o.state.clone().unwrap_or_default(),
                    o.note.clone().unwrap_or_default(),
                    timestamp_opt(o.created_time),
                ]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        OrdersCommand::Get { id, expand } => {
            let query = [("expand".to_owned(), expand.clone())];
            let raw = client.get(&format!("/v3/merchants/{{mId}}/orders/{id}"), &query).await?;
            let order: Order = decode_one(&raw)?;
            print_order(out, ctx.format, &raw, &order)?;
        }
        OrdersCommand::Create(args) => {
            let raw = client.post("/v3/merchants/{mId}/orders", &create_body(args)).await?;
            let order: Order = decode_one(&raw)?;
            info!(order = %order.id, "order created");
            print_order(out, ctx.format, &raw, &order)?;
        }
        OrdersCommand::AddItem { order_id, item_id, quantity } => {
            let body = json!({ "item": { "id": item_id }, "quantity": quantity });
            let raw = client.post(&format!("/v3/merchants/{{mId}}/orders/{order_id}/line_items"), &body).await?;
            let li: LineItem = decode_one(&raw)?;
            info!(order = %order_id, item = %item_id, quantity, "line item added");
            print_record(
                out,
                ctx.format,
                &raw,
                &li.id,
                &[
                    ("Line item", li.id.clone()),
                    ("Order", order_id.clone()),
                    ("Name", li.name.clone().unwrap_or_default()),
                    ("Price", money_opt(li.price)),
                ],
            )?;
        }
        OrdersCommand::Update { id, note } => {
            let raw = client.post(&format!("/v3/merchants/{{mId}}/orders/{id}"), &json!({ "note": note })).await?;
            let order: Order = decode_one(&raw)?;
            info!(order = %id, "order updated");
            print_order(out, ctx.format, &raw, &order)?;
        }
        OrdersCommand::Delete { id } => {
            client.delete(&format!("/v3/merchants/{{mId}}/orders/{id}")).await?;
            info!(order = %id, "order deleted");
            if ctx.format == OutputFormat::Table {
                writeln!(out, "Deleted order {id}.")?;
            }
        }
    }
    Ok(())
}

fn create_body(args: &CreateOrderArgs) -> Value {
    let mut body = json!({});
    if let Some(total) = args.total {
        body["total"] = json!(total);
    }
    if let Some(note) = &args.note {
        body["note"] = json!(note);
    }
    body
}

fn print_order(out: &mut dyn Write, format: OutputFormat, raw: &Value, o: &Order) -> std::io::Result<()> {
    let items = o.line_items.as_ref().map(|l| l.elements.as_slice()).unwrap_or_default();
    let mut fields = vec![
        ("ID", o.id.clone()),
        ("Total", money_opt(o.total)),
        ("State", o.state.clone().unwrap_or_default()),
        ("Note", o.note.clone().unwrap_or_default()),
        ("Created", timestamp_opt(o.created_time)),
        ("Line items", items.len().to_string()),
    ];
    for item in items {
        fields.push(("Item", format!("{} {}", item.name.clone().unwrap_or_default(), money_opt(item.price))));
    }
    print_record(out, format, raw, &o.id, &fields)
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
