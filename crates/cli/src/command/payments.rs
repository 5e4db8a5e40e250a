// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::{Args, Subcommand};
use cloverapi::models::{Payment, Refund};
use serde_json::{json, Value};
use tracing::info;

use super::{decode, decode_one, ListArgs, Listing, RangeArgs};
use crate::output::{money, print_list, print_record, timestamp_opt, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 20;

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// List payments.
    List(PaymentListArgs),
    /// Show one payment.
    Get { id: String },
    /// Refund a payment in full or in part.
    Refund(RefundArgs),
}

#[derive(Debug, Args)]
pub struct PaymentListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Only payments made against this order.
    #[arg(long)]
    pub order: Option<String>,
}

#[derive(Debug, Args)]
pub struct RefundArgs {
    pub id: String,

    /// Amount in cents; omit for a full refund.
    #[arg(long)]
    pub amount: Option<i64>,

    #[arg(long)]
    pub reason: Option<String>,
}

pub async fn run(ctx: &Context, cmd: &PaymentsCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        PaymentsCommand::List(args) => {
            let path = match &args.order {
                Some(order) => format!("/v3/merchants/{{mId}}/orders/{order}/payments"),
                None => "/v3/merchants/{mId}/payments".to_owned(),
            };
            let raw = Listing::new(&path, &args.list, PAGE_DEFAULT)
                .range(args.range.resolve()?)
                .fetch(ctx, &client)
                .await?;
            let payments: Vec<Payment> = decode(&raw)?;
            print_list(out, ctx.format, &raw, &table(&payments))?;
        }
        PaymentsCommand::Get { id } => {
            let raw = client.get(&format!("/v3/merchants/{{mId}}/payments/{id}"), &[]).await?;
            let payment: Payment = decode_one(&raw)?;
            print_record(out, ctx.format, &raw, &payment.id, &fields(&payment))?;
        }
        PaymentsCommand::Refund(args) => {
            let raw = client.post("/v3/merchants/{mId}/refunds", &refund_body(args)).await?;
            let refund: Refund = decode_one(&raw)?;
            info!(payment = %args.id, refund = %refund.id, amount = refund.amount, "refund processed");
            print_record(
                out,
                ctx.format,
                &raw,
                &refund.id,
                &[
                    ("Refund", refund.id.clone()),
                    ("Payment", args.id.clone()),
                    ("Amount", money(refund.amount)),
                    ("Created", timestamp_opt(refund.created_time)),
                ],
            )?;
        }
    }
    Ok(())
}

fn refund_body(args: &RefundArgs) -> Value {
    let mut body = json!({ "payment": { "id": args.id } });
    if let Some(amount) = args.amount {
        body["amount"] = json!(amount);
    }
    if let Some(reason) = &args.reason {
        body["reason"] = json!(reason);
    }
    body
}

fn table(payments: &[Payment]) -> Table {
    let mut table = Table::new(vec!["ID", "AMOUNT", "TIP", "RESULT", "TENDER", "CREATED"]);
    for p in payments {
        table.push(vec![
            p.id.clone(),
            money(p.amount),
            money(p.tip_amount),
            p.result.clone().unwrap_or_default(),
            p.tender.as_ref().and_then(|t| t.label.clone()).unwrap_or_default(),
            timestamp_opt(p.created_time),
        ]);
    }
    table
}

fn fields(p: &Payment) -> Vec<(&'static str, String)> {
    vec![
        ("ID", p.id.clone()),
        ("Amount", money(p.amount)),
        ("Tip", money(p.tip_amount)),
        ("Tax", money(p.tax_amount)),
        ("Result", p.result.clone().unwrap_or_default()),
        ("Tender", p.tender.as_ref().and_then(|t| t.label.clone()).unwrap_or_default()),
        ("Order", p.order.as_ref().map(|o| o.id.clone()).unwrap_or_default()),
        ("Employee", p.employee.as_ref().map(|e| e.id.clone()).unwrap_or_default()),
        ("Created", timestamp_opt(p.created_time)),
    ]
}

#[cfg(test)]
#[path = "payments_tests.rs"]
mod tests;
