// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clovercli_specs::{Cli, MockApi, TOKEN};
use serde_json::Value;

// -- CLI surface -------------------------------------------------------------

#[tokio::test]
async fn help_lists_command_groups() -> anyhow::Result<()> {
    let run = Cli::new()?.run(&["--help"]).await?;
    assert_eq!(run.code, Some(0), "{run:?}");
    for group in ["auth", "merchant", "payments", "orders", "items", "customers", "discounts", "employees", "reports", "api"] {
        assert!(run.stdout.contains(group), "missing {group}: {}", run.stdout);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_output_format_is_usage_error() -> anyhow::Result<()> {
    let run = Cli::new()?.run(&["-o", "yaml", "merchant", "get"]).await?;
    assert_eq!(run.code, Some(2), "{run:?}");
    Ok(())
}

// -- Auth --------------------------------------------------------------------

#[tokio::test]
async fn status_with_empty_store() -> anyhow::Result<()> {
    let run = Cli::new()?.run(&["auth", "status"]).await?;
    assert_eq!(run.code, Some(0), "{run:?}");
    assert_eq!(run.stdout.trim(), "Not logged in.");
    Ok(())
}

#[tokio::test]
async fn api_call_without_credentials_fails() -> anyhow::Result<()> {
    let cli = Cli::new()?;
    let run = cli.run(&["merchant", "get"]).await?;
    assert_eq!(run.code, Some(1), "{run:?}");
    assert!(run.stderr.starts_with("error:"), "{}", run.stderr);
    assert!(run.stderr.contains("auth login"), "{}", run.stderr);
    assert!(run.stdout.is_empty());
    assert!(!cli.config_dir().join("config.json").exists());
    Ok(())
}

#[tokio::test]
async fn rejected_static_token_fails() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, "wrong")?.run(&["merchant", "get"]).await?;
    assert_eq!(run.code, Some(1), "{run:?}");
    assert!(run.stderr.contains("credential rejected"), "{}", run.stderr);
    assert!(api.requests() >= 1);
    Ok(())
}

// -- Resources ---------------------------------------------------------------

#[tokio::test]
async fn merchant_get_json() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, TOKEN)?.run(&["-o", "json", "merchant", "get"]).await?;
    assert_eq!(run.code, Some(0), "{run:?}");

    let value: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(value["id"], "MSMOKE");
    assert_eq!(value["name"], "Smoke Cafe");
    Ok(())
}

#[tokio::test]
async fn payments_list_table() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, TOKEN)?.run(&["payments", "list"]).await?;
    assert_eq!(run.code, Some(0), "{run:?}");

    let lines: Vec<&str> = run.stdout.lines().collect();
    assert_eq!(lines.len(), 4, "{}", run.stdout);
    assert!(lines[0].starts_with("ID"));
    assert!(lines[1].starts_with("PAY1") && lines[1].contains("$12.50"));
    Ok(())
}

#[tokio::test]
async fn payments_list_quiet_prints_ids() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, TOKEN)?.run(&["-o", "quiet", "payments", "list"]).await?;
    assert_eq!(run.code, Some(0), "{run:?}");
    assert_eq!(run.stdout, "PAY1\nPAY2\nPAY3\n");
    Ok(())
}

#[tokio::test]
async fn sales_report_json() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, TOKEN)?
        .run(&["-o", "json", "reports", "sales", "--from", "2024-01-01", "--to", "2024-01-01"])
        .await?;
    assert_eq!(run.code, Some(0), "{run:?}");

    let value: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(value["grossSales"], 2500);
    assert_eq!(value["totalRefunds"], 250);
    assert_eq!(value["netSales"], 2250);
    assert_eq!(value["paymentCount"], 3);
    Ok(())
}

#[tokio::test]
async fn raw_api_post() -> anyhow::Result<()> {
    let api = MockApi::start().await?;
    let run = Cli::with_token(&api, TOKEN)?
        .run(&["api", "POST", "/v3/merchants/{mId}/refunds", "-d", r#"{"payment":{"id":"PAY1"},"amount":300}"#])
        .await?;
    assert_eq!(run.code, Some(0), "{run:?}");

    let value: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(value["id"], "REF2");
    assert_eq!(value["amount"], 300);
    Ok(())
}
