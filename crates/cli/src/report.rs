// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sales arithmetic over fetched payments, refunds, and orders.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use cloverapi::models::{Employee, Order, Payment, Refund};
use serde::Serialize;

use crate::period::{month_start, week_start, DateRange};

#[derive(Debug, Clone, Serialize)]
pub struct PeriodLabel {
    pub from: String,
    pub to: String,
}

impl From<&DateRange> for PeriodLabel {
    fn from(range: &DateRange) -> Self {
        Self { from: range.from.to_string(), to: range.to.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub period: PeriodLabel,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub total_refunds: i64,
    pub total_tax: i64,
    pub total_tips: i64,
    pub payment_count: usize,
    pub refund_count: usize,
    pub avg_payment: i64,
}

pub fn sales_summary(range: &DateRange, payments: &[Payment], refunds: &[Refund]) -> SalesSummary {
    let gross_sales: i64 = payments.iter().map(|p| p.amount).sum();
    let total_refunds: i64 = refunds.iter().map(|r| r.amount).sum();
    SalesSummary {
        period: range.into(),
        gross_sales,
        net_sales: gross_sales - total_refunds,
        total_refunds,
        total_tax: payments.iter().map(|p| p.tax_amount).sum(),
        total_tips: payments.iter().map(|p| p.tip_amount).sum(),
        payment_count: payments.len(),
        refund_count: refunds.len(),
        avg_payment: average(gross_sales, payments.len()),
    }
}

/// Totals for one day or one hour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub sales: i64,
    pub count: usize,
    pub tips: i64,
    pub tax: i64,
}

impl Bucket {
    fn add(&mut self, p: &Payment) {
        self.sales += p.amount;
        self.count += 1;
        self.tips += p.tip_amount;
        self.tax += p.tax_amount;
    }

    pub fn average(&self) -> i64 {
        average(self.sales, self.count)
    }
}

fn average(total: i64, count: usize) -> i64 {
    match i64::try_from(count) {
        Ok(n) if n > 0 => total / n,
        _ => 0,
    }
}

fn created(p: &Payment) -> Option<DateTime<Utc>> {
    utc(p.created_time)
}

fn utc(ms: Option<i64>) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms.unwrap_or(0))
}

/// Per-day totals keyed by UTC date (`YYYY-MM-DD`), in date order.
pub fn daily(payments: &[Payment]) -> BTreeMap<String, Bucket> {
    let mut days: BTreeMap<String, Bucket> = BTreeMap::new();
    for p in payments {
        let day = created(p).map(|t| t.date_naive().to_string()).unwrap_or_default();
        days.entry(day).or_default().add(p);
    }
    days
}

/// Totals for each of the 24 UTC hours.
pub fn hourly(payments: &[Payment]) -> Vec<Bucket> {
    let mut hours = vec![Bucket::default(); 24];
    for p in payments {
        let hour = created(p).map(|t| t.hour() as usize).unwrap_or(0);
        if let Some(bucket) = hours.get_mut(hour) {
            bucket.add(p);
        }
    }
    hours
}

/// `part` as a percentage of `whole`, or `None` for an empty whole.
pub fn share(part: i64, whole: i64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}

/// Relative change from `previous` to `current` in percent.
pub fn percent_change(current: i64, previous: i64) -> Option<f64> {
    (previous > 0).then(|| (current - previous) as f64 / previous as f64 * 100.0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodTotals {
    pub count: usize,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBreakdown {
    pub total: i64,
    pub count: usize,
    pub by_type: BTreeMap<String, MethodTotals>,
}

impl MethodBreakdown {
    /// Methods by amount, largest first.
    pub fn ranked(&self) -> Vec<(&str, &MethodTotals)> {
        let mut ranked: Vec<_> = self.by_type.iter().map(|(k, v)| (k.as_str(), v)).collect();
        ranked.sort_by(|a, b| b.1.amount.cmp(&a.1.amount).then(a.0.cmp(b.0)));
        ranked
    }
}

pub fn payment_methods(payments: &[Payment]) -> MethodBreakdown {
    let mut by_type: BTreeMap<String, MethodTotals> = BTreeMap::new();
    for p in payments {
        let totals = by_type.entry(p.method().to_owned()).or_default();
        totals.count += 1;
        totals.amount += p.amount;
    }
    MethodBreakdown { total: payments.iter().map(|p| p.amount).sum(), count: payments.len(), by_type }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSummary {
    pub total_refunded: i64,
    pub count: usize,
    pub average: i64,
    /// Newest first.
    pub refunds: Vec<Refund>,
}

pub fn refund_summary(refunds: &[Refund]) -> RefundSummary {
    let total_refunded: i64 = refunds.iter().map(|r| r.amount).sum();
    let mut sorted = refunds.to_vec();
    sorted.sort_by(|a, b| b.created_time.cmp(&a.created_time));
    RefundSummary { total_refunded, count: refunds.len(), average: average(total_refunded, refunds.len()), refunds: sorted }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub period: PeriodLabel,
    pub total_tax: i64,
    pub total_sales: i64,
    /// Tax over pre-tax sales, in percent.
    pub effective_rate: Option<f64>,
    pub payment_count: usize,
}

pub fn tax_summary(range: &DateRange, payments: &[Payment]) -> TaxSummary {
    let total_tax: i64 = payments.iter().map(|p| p.tax_amount).sum();
    let total_sales: i64 = payments.iter().map(|p| p.amount).sum();
    TaxSummary {
        period: range.into(),
        total_tax,
        total_sales,
        effective_rate: share(total_tax, total_sales - total_tax),
        payment_count: payments.len(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetTotals {
    pub gross: i64,
    pub refunds: i64,
    pub net: i64,
    pub txns: usize,
}

impl NetTotals {
    fn payment(&mut self, p: &Payment) {
        self.gross += p.amount;
        self.net += p.amount;
        self.txns += 1;
    }

    fn refund(&mut self, r: &Refund) {
        self.refunds += r.amount;
        self.net -= r.amount;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub today: NetTotals,
    pub week: NetTotals,
    pub month: NetTotals,
}

impl Dashboard {
    /// Totals that a record created on `day` counts toward.
    fn buckets(&mut self, day: NaiveDate, today: NaiveDate) -> impl Iterator<Item = &mut NetTotals> {
        let Dashboard { today: t, week: w, month: m } = self;
        let current = day <= today;
        [(day == today, t), (day >= week_start(today), w), (day >= month_start(today), m)]
            .into_iter()
            .filter(move |(hit, _)| current && *hit)
            .map(|(_, totals)| totals)
    }
}

/// Net sales for today, this week, and this month as of `today`.
pub fn dashboard(payments: &[Payment], refunds: &[Refund], today: NaiveDate) -> Dashboard {
    let mut board = Dashboard::default();
    for p in payments {
        if let Some(day) = utc(p.created_time).map(|t| t.date_naive()) {
            board.buckets(day, today).for_each(|t| t.payment(p));
        }
    }
    for r in refunds {
        if let Some(day) = utc(r.created_time).map(|t| t.date_naive()) {
            board.buckets(day, today).for_each(|t| t.refund(r));
        }
    }
    board
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub from: String,
    pub to: String,
    pub sales: i64,
    pub txns: usize,
    pub avg_txn: i64,
}

impl PeriodTotals {
    pub fn new(range: &DateRange, payments: &[Payment]) -> Self {
        let sales: i64 = payments.iter().map(|p| p.amount).sum();
        Self {
            from: range.from.to_string(),
            to: range.to.to_string(),
            sales,
            txns: payments.len(),
            avg_txn: average(sales, payments.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    pub sales: Option<f64>,
    pub txns: Option<f64>,
    pub avg_txn: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub period1: PeriodTotals,
    pub period2: PeriodTotals,
    /// Period 1 relative to period 2.
    pub changes: Changes,
}

pub fn compare(period1: PeriodTotals, period2: PeriodTotals) -> Comparison {
    let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    let changes = Changes {
        sales: percent_change(period1.sales, period2.sales),
        txns: percent_change(count(period1.txns), count(period2.txns)),
        avg_txn: percent_change(period1.avg_txn, period2.avg_txn),
    };
    Comparison { period1, period2, changes }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSales {
    pub id: String,
    pub name: String,
    pub sales: i64,
    pub txns: usize,
    pub tips: i64,
}

/// Sales per employee, largest first. Payments without an employee and
/// employees without sales are left out.
pub fn employee_sales(payments: &[Payment], employees: &[Employee]) -> Vec<EmployeeSales> {
    let names: HashMap<&str, &str> = employees.iter().map(|e| (e.id.as_str(), e.name.as_str())).collect();
    let mut by_id: HashMap<&str, EmployeeSales> = HashMap::new();
    for p in payments {
        let Some(id) = p.employee.as_ref().map(|e| e.id.as_str()) else { continue };
        let entry = by_id.entry(id).or_insert_with(|| EmployeeSales {
            id: id.to_owned(),
            name: names.get(id).copied().filter(|n| !n.is_empty()).unwrap_or(id).to_owned(),
            sales: 0,
            txns: 0,
            tips: 0,
        });
        entry.sales += p.amount;
        entry.txns += 1;
        entry.tips += p.tip_amount;
    }
    let mut ranked: Vec<_> = by_id.into_values().filter(|e| e.sales > 0).collect();
    ranked.sort_by(|a, b| b.sales.cmp(&a.sales).then_with(|| a.name.cmp(&b.name)));
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSales {
    pub id: Option<String>,
    pub name: String,
    pub quantity: usize,
    pub revenue: i64,
}

/// Line items across `orders` grouped by item, top `limit` by revenue.
pub fn top_items(orders: &[Order], limit: usize) -> Vec<ItemSales> {
    let mut by_key: HashMap<String, ItemSales> = HashMap::new();
    for line in orders.iter().filter_map(|o| o.line_items.as_ref()).flat_map(|l| &l.elements) {
        let id = line.item.as_ref().map(|i| i.id.clone());
        let name = line.name.clone().unwrap_or_else(|| "unknown".to_owned());
        let key = id.clone().unwrap_or_else(|| name.clone());
        let entry = by_key.entry(key).or_insert_with(|| ItemSales { id, name, quantity: 0, revenue: 0 });
        entry.quantity += 1;
        entry.revenue += line.price.unwrap_or(0);
    }
    let mut ranked: Vec<_> = by_key.into_values().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySales {
    pub name: String,
    pub sales: i64,
    pub items: usize,
    pub orders: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub total_sales: i64,
    pub categories: Vec<CategorySales>,
}

/// Line-item revenue per category. `category_of` maps item ids to a
/// category name; anything unmapped is [`UNCATEGORIZED`].
pub fn category_sales(orders: &[Order], category_of: &HashMap<String, String>) -> CategoryBreakdown {
    let mut totals: BTreeMap<&str, (i64, usize, BTreeSet<&str>)> = BTreeMap::new();
    for order in orders {
        for line in order.line_items.iter().flat_map(|l| &l.elements) {
            let category = line
                .item
                .as_ref()
                .and_then(|i| category_of.get(&i.id))
                .map(String::as_str)
                .unwrap_or(UNCATEGORIZED);
            let entry = totals.entry(category).or_default();
            entry.0 += line.price.unwrap_or(0);
            entry.1 += 1;
            entry.2.insert(order.id.as_str());
        }
    }
    let mut categories: Vec<CategorySales> = totals
        .into_iter()
        .filter(|(_, (sales, _, _))| *sales > 0)
        .map(|(name, (sales, items, orders))| CategorySales { name: name.to_owned(), sales, items, orders: orders.len() })
        .collect();
    categories.sort_by(|a, b| b.sales.cmp(&a.sales).then_with(|| a.name.cmp(&b.name)));
    CategoryBreakdown { total_sales: categories.iter().map(|c| c.sales).sum(), categories }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
