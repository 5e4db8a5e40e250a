// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use cloverapi::fetch::{FetchOptions, DEFAULT_LIMIT_TOTAL};
use cloverapi::models::{Category, Employee, Item, Order, Payment, Refund};
use serde_json::{json, Value};
use tracing::info;

use super::{decode, RangeArgs};
use crate::export::{self, ExportFormat};
use crate::output::{money, print_json, print_record, timestamp_opt, OutputFormat, Table};
use crate::period::{last_days, month_start, parse_date, today, week_start, DateRange};
use crate::report::{self, Bucket, NetTotals, PeriodTotals};
use crate::session::{Client, Context};

/// Window the analysis reports cover when no dates are given.
const RECENT_DAYS: u32 = 30;

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Gross and net sales, refunds, tax, and tips for a period.
    Sales(PeriodArgs),
    /// Sales per UTC day.
    Daily(PeriodArgs),
    /// Sales per UTC hour for one day.
    Hourly {
        /// Day to report (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Best-selling items by revenue (last 30 days by default).
    TopItems {
        #[command(flatten)]
        period: PeriodArgs,
        /// Number of items to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Sales by payment method (last 30 days by default).
    Payments(PeriodArgs),
    /// Refund totals and the most recent refunds (last 30 days by default).
    Refunds(PeriodArgs),
    /// Tax collected and the effective rate (last 30 days by default).
    Taxes(PeriodArgs),
    /// Net sales today, this week, and this month.
    Summary,
    /// Write orders, items, payments, or customers to a file.
    Export(ExportArgs),
    /// Sales by item category (last 30 days by default).
    Categories(PeriodArgs),
    /// Compare sales between two date ranges.
    Compare(CompareArgs),
    /// Sales by employee (last 30 days by default).
    Employees(PeriodArgs),
}

#[derive(Debug, Default, Args)]
pub struct PeriodArgs {
    /// First day (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, inclusive (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub to: Option<String>,

    /// Named period; overrides --from/--to.
    #[arg(long)]
    pub period: Option<String>,
}

impl PeriodArgs {
    fn range(&self) -> anyhow::Result<DateRange> {
        DateRange::from_args(self.from.as_deref(), self.to.as_deref(), self.period.as_deref(), today())
    }

    /// Like [`Self::range`], but the last 30 days when nothing was given.
    fn range_or_recent(&self) -> anyhow::Result<DateRange> {
        if self.from.is_none() && self.to.is_none() && self.period.is_none() {
            return Ok(last_days(RECENT_DAYS, today()));
        }
        self.range()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    Orders,
    Items,
    Payments,
    Customers,
}

impl ExportKind {
    fn resource(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Items => "items",
            Self::Payments => "payments",
            Self::Customers => "customers",
        }
    }

    fn dated(self) -> bool {
        matches!(self, Self::Orders | Self::Payments)
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub kind: ExportKind,

    /// Destination file; replaced if it exists.
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Most records to export.
    #[arg(long, default_value_t = DEFAULT_LIMIT_TOTAL)]
    pub limit: usize,

    /// Creation-date range; orders and payments only.
    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub period1_from: String,
    #[arg(long)]
    pub period1_to: String,
    #[arg(long)]
    pub period2_from: String,
    #[arg(long)]
    pub period2_to: String,
}

impl CompareArgs {
    fn ranges(&self) -> anyhow::Result<(DateRange, DateRange)> {
        Ok((
            DateRange::new(parse_date(&self.period1_from)?, parse_date(&self.period1_to)?)?,
            DateRange::new(parse_date(&self.period2_from)?, parse_date(&self.period2_to)?)?,
        ))
    }
}

pub async fn run(ctx: &Context, cmd: &ReportsCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    match cmd {
        ReportsCommand::Sales(args) => {
            let range = args.range()?;
            let client = ctx.client()?;
            let payments: Vec<Payment> = fetch(ctx, &client, "payments", &range).await?;
            let refunds: Vec<Refund> = fetch(ctx, &client, "refunds", &range).await?;
            let summary = report::sales_summary(&range, &payments, &refunds);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&summary)?)?;
                return Ok(());
            }
            let period = format!("{} to {}", summary.period.from, summary.period.to);
            print_record(
                out,
                OutputFormat::Table,
                &Value::Null,
                "",
                &[
                    ("Period", period),
                    ("Gross sales", money(summary.gross_sales)),
                    ("Refunds", money(-summary.total_refunds)),
                    ("Net sales", money(summary.net_sales)),
                    ("Tax", money(summary.total_tax)),
                    ("Tips", money(summary.total_tips)),
                    ("Payments", summary.payment_count.to_string()),
                    ("Refund count", summary.refund_count.to_string()),
                    ("Avg payment", money(summary.avg_payment)),
                ],
            )?;
        }
        ReportsCommand::Daily(args) => {
            let range = args.range()?;
            let client = ctx.client()?;
            let payments: Vec<Payment> = fetch(ctx, &client, "payments", &range).await?;
            let days = report::daily(&payments);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&days)?)?;
                return Ok(());
            }
            let mut table = Table::new(vec!["DATE", "SALES", "TXNS", "AVG", "TIPS", "TAX"]);
            let mut total = Bucket::default();
            for (day, b) in &days {
                table.push(bucket_row(day.clone(), b));
                total.sales += b.sales;
                total.count += b.count;
                total.tips += b.tips;
                total.tax += b.tax;
            }
            if days.is_empty() {
                writeln!(out, "No sales.")?;
                return Ok(());
            }
            table.push(bucket_row("TOTAL".to_owned(), &total));
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Hourly { date } => {
            let day = match date {
                Some(d) => parse_date(d)?,
                None => today(),
            };
            let range = DateRange::day(day);
            let client = ctx.client()?;
            let payments: Vec<Payment> = fetch(ctx, &client, "payments", &range).await?;
            let hours = report::hourly(&payments);

            if ctx.format == OutputFormat::Json {
                let hourly: Vec<_> = hours
                    .iter()
                    .enumerate()
                    .map(|(hour, b)| json!({ "hour": hour, "sales": b.sales, "count": b.count, "tips": b.tips, "tax": b.tax }))
                    .collect();
                print_json(out, &json!({ "date": day.to_string(), "hourly": hourly }))?;
                return Ok(());
            }
            let mut table = Table::new(vec!["HOUR", "SALES", "TXNS", "AVG", "TIPS", "TAX"]);
            for (hour, b) in hours.iter().enumerate().filter(|(_, b)| b.count > 0) {
                table.push(bucket_row(format!("{hour:02}:00"), b));
            }
            if table.rows().is_empty() {
                writeln!(out, "No sales on {day}.")?;
                return Ok(());
            }
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::TopItems { period, limit } => {
            let range = period.range_or_recent()?;
            let client = ctx.client()?;
            let orders: Vec<Order> = fetch_with(ctx, &client, "orders", Some(&range), &[("expand", "lineItems")]).await?;
            let top = report::top_items(&orders, *limit);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&top)?)?;
                return Ok(());
            }
            if top.is_empty() {
                writeln!(out, "No items sold.")?;
                return Ok(());
            }
            let mut table = Table::new(vec!["#", "ITEM", "QTY", "REVENUE"]);
            for (rank, item) in top.iter().enumerate() {
                table.push(vec![(rank + 1).to_string(), item.name.clone(), item.quantity.to_string(), money(item.revenue)]);
            }
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Payments(args) => {
            let range = args.range_or_recent()?;
            let client = ctx.client()?;
            let payments: Vec<Payment> = fetch(ctx, &client, "payments", &range).await?;
            let breakdown = report::payment_methods(&payments);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&breakdown)?)?;
                return Ok(());
            }
            let mut table = Table::new(vec!["METHOD", "TXNS", "AMOUNT", "SHARE"]);
            for (method, totals) in breakdown.ranked() {
                table.push(vec![
                    method.to_owned(),
                    totals.count.to_string(),
                    money(totals.amount),
                    percent(report::share(totals.amount, breakdown.total)),
                ]);
            }
            table.push(vec!["TOTAL".to_owned(), breakdown.count.to_string(), money(breakdown.total), String::new()]);
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Refunds(args) => {
            let range = args.range_or_recent()?;
            let client = ctx.client()?;
            let refunds: Vec<Refund> = fetch(ctx, &client, "refunds", &range).await?;
            let summary = report::refund_summary(&refunds);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&summary)?)?;
                return Ok(());
            }
            print_record(
                out,
                OutputFormat::Table,
                &Value::Null,
                "",
                &[
                    ("Period", format!("{} to {}", range.from, range.to)),
                    ("Total refunded", money(summary.total_refunded)),
                    ("Refunds", summary.count.to_string()),
                    ("Average", money(summary.average)),
                ],
            )?;
            if summary.refunds.is_empty() {
                return Ok(());
            }
            let mut table = Table::new(vec!["DATE", "AMOUNT", "REASON"]);
            for r in summary.refunds.iter().take(10) {
                let reason = r.reason.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "No reason".to_owned());
                table.push(vec![timestamp_opt(r.created_time), money(r.amount), reason]);
            }
            writeln!(out)?;
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Taxes(args) => {
            let range = args.range_or_recent()?;
            let client = ctx.client()?;
            let payments: Vec<Payment> = fetch(ctx, &client, "payments", &range).await?;
            let taxes = report::tax_summary(&range, &payments);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&taxes)?)?;
                return Ok(());
            }
            print_record(
                out,
                OutputFormat::Table,
                &Value::Null,
                "",
                &[
                    ("Period", format!("{} to {}", taxes.period.from, taxes.period.to)),
                    ("Total sales", money(taxes.total_sales)),
                    ("Tax collected", money(taxes.total_tax)),
                    ("Effective rate", percent(taxes.effective_rate)),
                    ("Payments", taxes.payment_count.to_string()),
                ],
            )?;
        }
        ReportsCommand::Summary => {
            let today = today();
            let range = DateRange::new(week_start(today).min(month_start(today)), today)?;
            let client = ctx.client()?;
            let (payments, refunds): (Vec<Payment>, Vec<Refund>) = tokio::try_join!(
                fetch(ctx, &client, "payments", &range),
                fetch(ctx, &client, "refunds", &range),
            )?;
            let board = report::dashboard(&payments, &refunds, today);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&board)?)?;
                return Ok(());
            }
            let mut table = Table::new(vec!["PERIOD", "GROSS", "REFUNDS", "NET", "TXNS"]);
            for (label, t) in [("Today", &board.today), ("This week", &board.week), ("This month", &board.month)] {
                table.push(net_row(label, t));
            }
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Export(args) => {
            let resolved = args.range.resolve()?;
            anyhow::ensure!(
                resolved.is_none() || args.kind.dated(),
                "--from/--to apply to orders and payments exports only"
            );
            let opts = match resolved {
                Some((from_ms, to_ms)) => FetchOptions::range(from_ms, to_ms),
                None => FetchOptions::default(),
            }
            .with_limit(args.limit);
            let client = ctx.client()?;
            let resource = args.kind.resource();
            let path = format!("/v3/merchants/{{mId}}/{resource}");
            let records = ctx.fetcher(&client).fetch_all(&path, &opts).await?;
            export::write_file(&args.file, args.format, &records)?;
            info!(resource, count = records.len(), file = %args.file.display(), "export written");

            match ctx.format {
                OutputFormat::Json => {
                    print_json(out, &json!({ "type": resource, "count": records.len(), "file": args.file }))?;
                }
                OutputFormat::Quiet => writeln!(out, "{}", args.file.display())?,
                OutputFormat::Table => {
                    writeln!(out, "Exported {} {resource} to {}", records.len(), args.file.display())?
                }
            }
        }
        ReportsCommand::Categories(args) => {
            let range = args.range_or_recent()?;
            let client = ctx.client()?;
            let (orders, items): (Vec<Order>, Vec<Item>) = tokio::try_join!(
                fetch_with(ctx, &client, "orders", Some(&range), &[("expand", "lineItems")]),
                fetch_with(ctx, &client, "items", None, &[("expand", "categories")]),
            )?;
            let category_of: HashMap<String, String> = items
                .into_iter()
                .filter_map(|i| {
                    let first: Option<Category> = i.categories.and_then(|c| c.elements.into_iter().next());
                    first.map(|c| (i.id, c.name))
                })
                .collect();
            let breakdown = report::category_sales(&orders, &category_of);

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&breakdown)?)?;
                return Ok(());
            }
            if breakdown.categories.is_empty() {
                writeln!(out, "No sales.")?;
                return Ok(());
            }
            let mut table = Table::new(vec!["CATEGORY", "SALES", "ITEMS", "ORDERS", "SHARE"]);
            for c in &breakdown.categories {
                table.push(vec![
                    c.name.clone(),
                    money(c.sales),
                    c.items.to_string(),
                    c.orders.to_string(),
                    percent(report::share(c.sales, breakdown.total_sales)),
                ]);
            }
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Compare(args) => {
            let (first, second) = args.ranges()?;
            let client = ctx.client()?;
            let (p1, p2): (Vec<Payment>, Vec<Payment>) = tokio::try_join!(
                fetch(ctx, &client, "payments", &first),
                fetch(ctx, &client, "payments", &second),
            )?;
            let comparison = report::compare(PeriodTotals::new(&first, &p1), PeriodTotals::new(&second, &p2));

            if ctx.format == OutputFormat::Json {
                print_json(out, &serde_json::to_value(&comparison)?)?;
                return Ok(());
            }
            let label = |t: &PeriodTotals| format!("{} to {}", t.from, t.to);
            let mut table = Table::new(vec!["", "SALES", "TXNS", "AVG"]);
            for t in [&comparison.period1, &comparison.period2] {
                table.push(vec![label(t), money(t.sales), t.txns.to_string(), money(t.avg_txn)]);
            }
            let c = &comparison.changes;
            table.push(vec!["CHANGE".to_owned(), change(c.sales), change(c.txns), change(c.avg_txn)]);
            out.write_all(table.render().as_bytes())?;
        }
        ReportsCommand::Employees(args) => {
            let range = args.range_or_recent()?;
            let client = ctx.client()?;
            let (payments, employees): (Vec<Payment>, Vec<Employee>) = tokio::try_join!(
                fetch(ctx, &client, "payments", &range),
                fetch_with(ctx, &client, "employees", None, &[]),
            )?;
            let ranked = report::employee_sales(&payments, &employees);
            let total_sales: i64 = ranked.iter().map(|e| e.sales).sum();

            if ctx.format == OutputFormat::Json {
                print_json(out, &json!({ "totalSales": total_sales, "employees": ranked }))?;
                return Ok(());
            }
            if ranked.is_empty() {
                writeln!(out, "No sales.")?;
                return Ok(());
            }
            let mut table = Table::new(vec!["EMPLOYEE", "SALES", "TXNS", "AVG", "TIPS"]);
            for e in &ranked {
                let avg = Bucket { sales: e.sales, count: e.txns, ..Bucket::default() }.average();
                table.push(vec![e.name.clone(), money(e.sales), e.txns.to_string(), money(avg), money(e.tips)]);
            }
            out.write_all(table.render().as_bytes())?;
        }
    }
    Ok(())
}

async fn fetch<T: serde::de::DeserializeOwned>(
    ctx: &Context,
    client: &Client,
    resource: &str,
    range: &DateRange,
) -> anyhow::Result<Vec<T>> {
    fetch_with(ctx, client, resource, Some(range), &[]).await
}

/// Every record of `resource`, optionally limited to a creation-date range.
async fn fetch_with<T: serde::de::DeserializeOwned>(
    ctx: &Context,
    client: &Client,
    resource: &str,
    range: Option<&DateRange>,
    params: &[(&str, &str)],
) -> anyhow::Result<Vec<T>> {
    let mut opts = match range {
        Some(range) => {
            let (from_ms, to_ms) = range.to_ms();
            FetchOptions::range(from_ms, to_ms)
        }
        None => FetchOptions::default(),
    };
    for (key, value) in params {
        opts = opts.with_param(*key, *value);
    }
    let path = format!("/v3/merchants/{{mId}}/{resource}");
    let raw = ctx.fetcher(client).fetch_all(&path, &opts).await?;
    info!(resource, count = raw.len(), "fetched report data");
    decode(&raw)
}

fn bucket_row(label: String, b: &Bucket) -> Vec<String> {
    vec![label, money(b.sales), b.count.to_string(), money(b.average()), money(b.tips), money(b.tax)]
}

fn net_row(label: &str, t: &NetTotals) -> Vec<String> {
    vec![label.to_owned(), money(t.gross), money(-t.refunds), money(t.net), t.txns.to_string()]
}

fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}%")).unwrap_or_else(|| "n/a".to_owned())
}

fn change(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.1}%")).unwrap_or_else(|| "n/a".to_owned())
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
