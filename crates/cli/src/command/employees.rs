// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::Subcommand;
use cloverapi::models::Employee;
use serde_json::Value;

use super::{decode, decode_one, ListArgs, Listing};
use crate::output::{print_list, print_record, OutputFormat, Table};
use crate::session::Context;

const PAGE_DEFAULT: usize = 50;

#[derive(Debug, Subcommand)]
pub enum EmployeesCommand {
    /// List employees.
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one employee.
    Get { id: String },
    /// Show the employee the token belongs to.
    Me,
}

pub async fn run(ctx: &Context, cmd: &EmployeesCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        EmployeesCommand::List { list } => {
            let raw = Listing::new("/v3/merchants/{mId}/employees", list, PAGE_DEFAULT).fetch(ctx, &client).await?;
            let employees: Vec<Employee> = decode(&raw)?;
            let mut table = Table::new(vec!["ID", "NAME", "ROLE", "EMAIL"]);
            for e in &employees {
                table.push(vec![
                    e.id.clone(),
                    e.name.clone(),
                    e.role.clone().unwrap_or_default(),
                    e.email.clone().unwrap_or_default(),
                ]);
            }
            print_list(out, ctx.format, &raw, &table)?;
        }
        EmployeesCommand::Get { id } => {
            let raw = client.get(&format!("/v3/merchants/{{mId}}/employees/{id}"), &[]).await?;
            print_employee(out, ctx.format, &raw)?;
        }
        EmployeesCommand::Me => {
            let raw = client.get("/v3/merchants/{mId}/employees/current", &[]).await?;
            print_employee(out, ctx.format, &raw)?;
        }
    }
    Ok(())
}

fn print_employee(out: &mut dyn Write, format: OutputFormat, raw: &Value) -> anyhow::Result<()> {
    let e: Employee = decode_one(raw)?;
    print_record(
        out,
        format,
        raw,
        &e.id,
        &[
            ("ID", e.id.clone()),
            ("Name", e.name.clone()),
            ("Nickname", e.nickname.clone().unwrap_or_default()),
            ("Role", e.role.clone().unwrap_or_default()),
            ("Email", e.email.clone().unwrap_or_default()),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "employees_tests.rs"]
mod tests;
