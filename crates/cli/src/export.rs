// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writing fetched records to a file as JSON or CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Columns are the scalar fields of the first record, in key order.
/// Nested objects, arrays, and nulls are left out.
pub fn csv_headers(records: &[Value]) -> Vec<String> {
    let Some(Value::Object(first)) = records.first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|(_, v)| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .map(|(k, _)| k.clone())
        .collect()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

pub fn write_csv<W: Write>(writer: W, records: &[Value]) -> anyhow::Result<()> {
    let headers = csv_headers(records);
    let mut csv = csv::Writer::from_writer(writer);
    if headers.is_empty() {
        csv.flush()?;
        return Ok(());
    }
    csv.write_record(&headers)?;
    for record in records {
        csv.write_record(headers.iter().map(|h| cell(record.get(h))))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut writer: W, records: &[Value]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `records` to `path`, replacing any existing file.
pub fn write_file(path: &Path, format: ExportFormat, records: &[Value]) -> anyhow::Result<()> {
    let file = File::create(path).map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
    let writer = BufWriter::new(file);
    match format {
        ExportFormat::Json => write_json(writer, records),
        ExportFormat::Csv => write_csv(writer, records),
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
