// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `clovercli` binary as a subprocess against an in-process
//! mock of the merchant API.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Bearer token the mock API accepts.
pub const TOKEN: &str = "smoke-token";

/// Resolve the path to the compiled `clovercli` binary.
pub fn clovercli_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("clovercli")
}

#[derive(Clone, Default)]
struct ApiState {
    requests: Arc<AtomicUsize>,
}

/// Mock merchant API on `127.0.0.1:0`.
pub struct MockApi {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl MockApi {
    pub async fn start() -> anyhow::Result<Self> {
        let state = ApiState::default();
        let requests = Arc::clone(&state.requests);
        let app = Router::new()
            .route("/v3/merchants/{mid}", get(merchant))
            .route("/v3/merchants/{mid}/payments", get(payments))
            .route("/v3/merchants/{mid}/refunds", get(refunds).post(refund))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self { addr, requests })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

fn authorized(state: &ApiState, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    state.requests.fetch_add(1, Ordering::Relaxed);
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    if bearer == Some(&format!("Bearer {TOKEN}")) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "401 Unauthorized" }))))
    }
}

async fn merchant(
    State(state): State<ApiState>,
    UrlPath(mid): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;
    Ok(Json(json!({ "id": mid, "name": "Smoke Cafe", "defaultCurrency": "USD" })))
}

/// Three payments on 2024-01-01; honours `offset`.
async fn payments(
    State(state): State<ApiState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;
    let offset = query.iter().find(|(k, _)| k == "offset").and_then(|(_, v)| v.parse().ok()).unwrap_or(0usize);
    let all = [
        json!({ "id": "PAY1", "amount": 1250, "tipAmount": 100, "taxAmount": 90, "result": "SUCCESS", "createdTime": 1_704_099_600_000i64 }),
        json!({ "id": "PAY2", "amount": 800, "taxAmount": 60, "result": "SUCCESS", "createdTime": 1_704_103_200_000i64 }),
        json!({ "id": "PAY3", "amount": 450, "result": "SUCCESS", "createdTime": 1_704_106_800_000i64 }),
    ];
    let page: Vec<Value> = all.into_iter().skip(offset).collect();
    Ok(Json(json!({ "elements": page })))
}

async fn refunds(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;
    Ok(Json(json!({ "elements": [{ "id": "REF1", "amount": 250 }] })))
}

async fn refund(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;
    let amount = body.get("amount").cloned().unwrap_or(json!(1250));
    Ok(Json(json!({ "id": "REF2", "amount": amount, "payment": body.get("payment") })))
}

/// Finished `clovercli` invocation.
#[derive(Debug)]
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// One isolated config dir plus environment for invoking the binary.
pub struct Cli {
    config: tempfile::TempDir,
    env: Vec<(String, String)>,
}

impl Cli {
    /// Empty config dir, no credentials.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { config: tempfile::tempdir()?, env: Vec::new() })
    }

    /// Static-token access to `api` as merchant `MSMOKE`.
    pub fn with_token(api: &MockApi, token: &str) -> anyhow::Result<Self> {
        Ok(Self::new()?
            .env("CLOVER_API_URL", &api.url())
            .env("CLOVER_ACCESS_TOKEN", token)
            .env("CLOVER_MERCHANT_ID", "MSMOKE"))
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn config_dir(&self) -> &Path {
        self.config.path()
    }

    /// Run the binary to completion without blocking the mock server.
    pub async fn run(&self, args: &[&str]) -> anyhow::Result<Run> {
        let binary = clovercli_binary();
        anyhow::ensure!(binary.exists(), "clovercli binary not found at {}", binary.display());

        let output = tokio::process::Command::new(&binary)
            .args(args)
            .env_clear()
            .env("CLOVER_CONFIG_DIR", self.config.path())
            .env("CLOVER_LOG_LEVEL", "warn")
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .await?;
        Ok(Run {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
