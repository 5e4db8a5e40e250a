// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::{Args, Subcommand};
use cloverapi::models::Customer;
use serde_json::{json, Value};
use tracing::info;

use super::{decode, decode_one, ListArgs, Listing};
use crate::output::{print_list, print_record, timestamp_opt, OutputFormat, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 50;

const EXPAND: &str = "emailAddresses,phoneNumbers";

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    /// List customers.
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Server-side filter expression (e.g. `emailAddress=a@b.com`).
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one customer.
    Get { id: String },
    /// Create a customer.
    Create(CustomerFields),
    /// Change a customer's name or phone number.
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a customer.
    Delete { id: String },
}

#[derive(Debug, Default, Args)]
pub struct CustomerFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl CustomerFields {
    /// Request body with only the given fields. Contact details are lists.
    fn body(&self) -> Value {
        let mut body = json!({});
        if let Some(first) = &self.first_name {
            body["firstName"] = json!(first);
        }
        if let Some(last) = &self.last_name {
            body["lastName"] = json!(last);
        }
        if let Some(email) = &self.email {
            body["emailAddresses"] = json!([{ "emailAddress": email }]);
        }
        if let Some(phone) = &self.phone {
            body["phoneNumbers"] = json!([{ "phoneNumber": phone }]);
        }
        body
    }
}

pub async fn run(ctx: &Context, cmd: &CustomersCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        CustomersCommand::List { list, filter } => {
            let mut listing = Listing::new("/v3/merchants/{mId}/customers", list, PAGE_DEFAULT)
                .param("expand", EXPAND);
            if let Some(filter) = filter {
                listing = listing.param("filter", filter);
            }
            let raw = listing.fetch(ctx, &client).await?;
            let customers: Vec<Customer> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "NAME", "EMAIL", "PHONE"]);
            for c in &customers {
                table.push(vec![
                    c.id.clone(),
                    c.full_name(),
                    c.email().unwrap_or_default().to_owned(),
                    c.phone().unwrap_or_default().to_owned(),
                ]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        CustomersCommand::Get { id } => {
            let query = [("expand".to_owned(), EXPAND.to_owned())];
            let raw = client.get(&format!("/v3/merchants/{{mId}}/customers/{id}"), &query).await?;
            print_customer(out, ctx.format, &raw)?;
        }
        CustomersCommand::Create(fields) => {
            let raw = client.post("/v3/merchants/{mId}/customers", &fields.body()).await?;
            info!("customer created");
            print_customer(out, ctx.format, &raw)?;
        }
        CustomersCommand::Update { id, first_name, last_name, phone } => {
            let fields = CustomerFields {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: None,
                phone: phone.clone(),
            };
            let body = fields.body();
            anyhow::ensure!(
                body.as_object().is_some_and(|m| !m.is_empty()),
                "nothing to update; pass --first-name, --last-name, or --phone"
            );
            let raw = client.post(&format!("/v3/merchants/{{mId}}/customers/{id}"), &body).await?;
            info!(customer = %id, "customer updated");
            print_customer(out, ctx.format, &raw)?;
        }
        CustomersCommand::Delete { id } => {
            client.delete(&format!("/v3/merchants/{{mId}}/customers/{id}")).await?;
            info!(customer = %id, "customer deleted");
            if ctx.format == OutputFormat::Table {
                writeln!(out, "Deleted customer {id}.")?;
            }
        }
    }
    Ok(())
}

fn print_customer(out: &mut dyn Write, format: OutputFormat, raw: &Value) -> anyhow::Result<()> {
    let c: Customer = decode_one(raw)?;
    print_record(
        out,
        format,
        raw,
        &c.id,
        &[
            ("ID", c.id.clone()),
            ("Name", c.full_name()),
            ("Email", c.email().unwrap_or_default().to_owned()),
            ("Phone", c.phone().unwrap_or_default().to_owned()),
            ("Customer since", timestamp_opt(c.customer_since)),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "customers_tests.rs"]
mod tests;
