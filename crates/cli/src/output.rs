// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of command results as tables, JSON, or bare IDs.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Json => f.write_str("json"),
            Self::Quiet => f.write_str("quiet"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            other => Err(format!("invalid output format: {other} (expected table, json, or quiet)")),
        }
    }
}

/// `$12.50` from 1250 cents.
pub fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

pub fn money_opt(cents: Option<i64>) -> String {
    cents.map(money).unwrap_or_default()
}

/// UTC `YYYY-MM-DD HH:MM` from epoch milliseconds.
pub fn timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

pub fn timestamp_opt(ms: Option<i64>) -> String {
    ms.map(timestamp).unwrap_or_default()
}

/// Fixed-width table with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        for row in std::iter::once(&header).chain(&self.rows) {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:<w$}", w = widths.get(i).copied().unwrap_or(0)))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

pub fn print_json(out: &mut dyn Write, value: &Value) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{text}")
}

/// A list of records: raw JSON array, first column only, or the table.
pub fn print_list(
    out: &mut dyn Write,
    format: OutputFormat,
    raw: &[Value],
    table: &Table,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => print_json(out, &Value::Array(raw.to_vec())),
        OutputFormat::Quiet => {
            for row in table.rows() {
                if let Some(id) = row.first() {
                    writeln!(out, "{id}")?;
                }
            }
            Ok(())
        }
        OutputFormat::Table => {
            if table.rows().is_empty() {
                return writeln!(out, "No results.");
            }
            out.write_all(table.render().as_bytes())
        }
    }
}

/// A single record: raw JSON, its ID, or a field/value listing.
pub fn print_record(
    out: &mut dyn Write,
    format: OutputFormat,
    raw: &Value,
    id: &str,
    fields: &[(&str, String)],
) -> io::Result<()> {
    match format {
        OutputFormat::Json => print_json(out, raw),
        OutputFormat::Quiet => writeln!(out, "{id}"),
        OutputFormat::Table => {
            let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            for (key, value) in fields {
                writeln!(out, "{:<width$}  {}", format!("{key}:"), value, width = width + 1)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
