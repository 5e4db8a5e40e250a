// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calendar date ranges for `--from/--to`, `--period`, and `--date`.
//!
//! Days are UTC. A range is inclusive of both end dates and maps to the
//! half-open millisecond interval `[from 00:00, to + 1 day 00:00)`.

use chrono::{Datelike, Months, NaiveDate, Utc};

pub const PERIODS: &str = "today, yesterday, this-week, last-week, this-month, last-month, mtd, ytd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> anyhow::Result<Self> {
        anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
        Ok(Self { from, to })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// `[from 00:00 UTC, to + 1 day 00:00 UTC)` in epoch milliseconds.
    pub fn to_ms(&self) -> (u64, u64) {
        let end = self.to.succ_opt().unwrap_or(self.to);
        (day_start_ms(self.from), day_start_ms(end))
    }

    /// Resolve report arguments. `--period` wins over `--from/--to`.
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        period: Option<&str>,
        today: NaiveDate,
    ) -> anyhow::Result<Self> {
        if let Some(period) = period {
            return parse_period(period, today);
        }
        match (from, to) {
            (Some(from), Some(to)) => Self::new(parse_date(from)?, parse_date(to)?),
            (Some(from), None) => Self::new(parse_date(from)?, today),
            _ => anyhow::bail!("provide --from/--to or --period ({PERIODS})"),
        }
    }
}

fn day_start_ms(date: NaiveDate) -> u64 {
    date.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc().timestamp_millis())
        .unwrap_or(0)
        .max(0) as u64
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The `days` days ending with `today`.
pub fn last_days(days: u32, today: NaiveDate) -> DateRange {
    let from = today - chrono::Duration::days(i64::from(days.saturating_sub(1)));
    DateRange { from, to: today }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date {s:?} (expected YYYY-MM-DD): {e}"))
}

/// Named period relative to `today`. Weeks start on Sunday.
pub fn parse_period(name: &str, today: NaiveDate) -> anyhow::Result<DateRange> {
    let first_of_month = month_start(today);
    let week_start = week_start(today);

    let (from, to) = match name.to_lowercase().as_str() {
        "today" => (today, today),
        "yesterday" => {
            let y = today.pred_opt().unwrap_or(today);
            (y, y)
        }
        "this-week" => (week_start, today),
        "last-week" => {
            let end = week_start.pred_opt().unwrap_or(week_start);
            (end - chrono::Duration::days(6), end)
        }
        "this-month" | "mtd" => (first_of_month, today),
        "last-month" => {
            let start = first_of_month.checked_sub_months(Months::new(1)).unwrap_or(first_of_month);
            (start, first_of_month.pred_opt().unwrap_or(first_of_month))
        }
        "ytd" => (today.with_ordinal(1).unwrap_or(today), today),
        other => anyhow::bail!("unknown period: {other} (use: {PERIODS})"),
    };
    DateRange::new(from, to)
}

#[cfg(test)]
#[path = "period_tests.rs"]
mod tests;
