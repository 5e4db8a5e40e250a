// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::{Args, Subcommand};
use cloverapi::models::{Category, Item, ItemStock};
use serde_json::{json, Value};
use tracing::info;

use super::{decode, decode_one, ListArgs, Listing};
use crate::output::{money_opt, print_list, print_record, OutputFormat, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 50;

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// List inventory items.
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one item.
    Get { id: String },
    /// Create an item.
    Create(CreateItemArgs),
    /// Change an item's name, price, or SKU.
    Update(UpdateItemArgs),
    /// Delete an item.
    Delete { id: String },
    /// Show or set the stock level of an item.
    Stock {
        id: String,
        /// New quantity on hand.
        #[arg(long = "set")]
        set: Option<f64>,
    },
    /// List or create item categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List categories.
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a category.
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateItemArgs {
    #[arg(long)]
    pub name: String,

    /// Price in cents.
    #[arg(long)]
    pub price: Option<i64>,

    #[arg(long)]
    pub sku: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateItemArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    /// Price in cents.
    #[arg(long)]
    pub price: Option<i64>,

    #[arg(long)]
    pub sku: Option<String>,
}

pub async fn run(ctx: &Context, cmd: &ItemsCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        ItemsCommand::List { list } => {
            let raw = Listing::new("/v3/merchants/{mId}/items", list, PAGE_DEFAULT).fetch(ctx, &client).await?;
            let items: Vec<Item> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "NAME", "PRICE", "SKU"]);
            for i in &items {
                table.push(vec![i.id.clone(), i.name.clone(), money_opt(i.price), i.sku.clone().unwrap_or_default()]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        ItemsCommand::Get { id } => {
            let raw = client.get(&format!("/v3/merchants/{{mId}}/items/{id}"), &[]).await?;
            print_item(out, ctx.format, &raw)?;
        }
        ItemsCommand::Create(args) => {
            let raw = client.post("/v3/merchants/{mId}/items", &create_body(args)).await?;
            info!(name = %args.name, "item created");
            print_item(out, ctx.format, &raw)?;
        }
        ItemsCommand::Update(args) => {
            let body = update_body(args)?;
            let raw = client.post(&format!("/v3/merchants/{{mId}}/items/{}", args.id), &body).await?;
            info!(item = %args.id, "item updated");
            print_item(out, ctx.format, &raw)?;
        }
        ItemsCommand::Delete { id } => {
            client.delete(&format!("/v3/merchants/{{mId}}/items/{id}")).await?;
            info!(item = %id, "item deleted");
            if ctx.format == OutputFormat::Table {
                writeln!(out, "Deleted item {id}.")?;
            }
        }
        ItemsCommand::Stock { id, set } => {
            let path = format!("/v3/merchants/{{mId}}/item_stocks/{id}");
            let raw = match set {
                Some(quantity) => {
                    info!(item = %id, quantity, "setting stock");
                    client.post(&path, &json!({ "quantity": quantity })).await?
                }
                None => client.get(&path, &[]).await?,
            };
            let stock: ItemStock = decode_one(&raw)?;
            let quantity = stock.quantity.map(|q| q.to_string()).unwrap_or_else(|| "untracked".to_owned());
            print_record(out, ctx.format, &raw, id, &[("Item", id.clone()), ("Quantity", quantity)])?;
        }
        ItemsCommand::Categories { command: CategoriesCommand::List { list } } => {
            let raw =
                Listing::new("/v3/merchants/{mId}/categories", list, PAGE_DEFAULT).fetch(ctx, &client).await?;
            let categories: Vec<Category> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "NAME", "SORT"]);
            for c in &categories {
                table.push(vec![c.id.clone(), c.name.clone(), c.sort_order.map(|s| s.to_string()).unwrap_or_default()]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        ItemsCommand::Categories { command: CategoriesCommand::Create { name } } => {
            let raw = client.post("/v3/merchants/{mId}/categories", &json!({ "name": name })).await?;
            let c: Category = decode_one(&raw)?;
            info!(category = %c.id, "category created");
            print_record(out, ctx.format, &raw, &c.id, &[("ID", c.id.clone()), ("Name", c.name.clone())])?;
        }
    }
    Ok(())
}

fn create_body(args: &CreateItemArgs) -> Value {
    let mut body = json!({ "name": args.name });
    if let Some(price) = args.price {
        body["price"] = json!(price);
    }
    if let Some(sku) = &args.sku {
        body["sku"] = json!(sku);
    }
    body
}

/// Only the flags that were given; an empty update is refused.
fn update_body(args: &UpdateItemArgs) -> anyhow::Result<Value> {
    let mut body = json!({});
    if let Some(name) = &args.name {
        body["name"] = json!(name);
    }
    if let Some(price) = args.price {
        body["price"] = json!(price);
    }
    if let Some(sku) = &args.sku {
        body["sku"] = json!(sku);
    }
    anyhow::ensure!(body.as_object().is_some_and(|m| !m.is_empty()), "nothing to update; pass --name, --price, or --sku");
    Ok(body)
}

fn print_item(out: &mut dyn Write, format: OutputFormat, raw: &Value) -> anyhow::Result<()> {
    let item: Item = decode_one(raw)?;
    print_record(
        out,
        format,
        raw,
        &item.id,
        &[
            ("ID", item.id.clone()),
            ("Name", item.name.clone()),
            ("Price", money_opt(item.price)),
            ("SKU", item.sku.clone().unwrap_or_default()),
            ("Available", item.available.map(|a| a.to_string()).unwrap_or_default()),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
