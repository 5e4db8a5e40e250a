// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a mock merchant API, context builders, and
//! assertion helpers.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use cloverapi::config::{EnvOverrides, Region};
use cloverapi::credential::CredentialRecord;
use cloverapi::transport::RetryPolicy;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::output::OutputFormat;
use crate::session::Context;

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let msg = $expr.err().map(|e| e.to_string());
        assert!(
            msg.as_deref().is_some_and(|m| m.contains($substr)),
            "expected error containing {:?} from {}, got: {msg:?}",
            $substr,
            stringify!($expr)
        );
    }};
}

/// Overrides as if only `vars` were set, with the config dir in `dir`.
pub fn env_with(dir: &tempfile::TempDir, vars: &[(&str, &str)]) -> EnvOverrides {
    let config_dir = dir.path().to_string_lossy().into_owned();
    EnvOverrides::from_lookup(|name| {
        if name == "CLOVER_CONFIG_DIR" {
            return Some(config_dir.clone());
        }
        vars.iter().find(|(k, _)| *k == name).map(|(_, v)| (*v).to_owned())
    })
}

pub fn record(access: &str, refresh: Option<&str>, expires_at: Option<u64>, region: Region) -> CredentialRecord {
    CredentialRecord {
        client_id: "cid".into(),
        client_secret: "secret".into(),
        access_token: access.into(),
        refresh_token: refresh.map(str::to_owned),
        expires_at,
        region,
    }
}

/// One request as seen by [`MockApi`].
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Hit {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn params(&self, name: &str) -> Vec<&str> {
        self.query.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str()).collect()
    }
}

type Responder = Arc<dyn Fn(&Hit) -> (u16, Value) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Merchant API stand-in on `127.0.0.1:0`. Every request is recorded.
pub struct MockApi {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Hit>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockApi {
    pub async fn start(responder: impl Fn(&Hit) -> (u16, Value) + Send + Sync + 'static) -> anyhow::Result<Self> {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { responder: Arc::new(responder), hits: Arc::clone(&hits) };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self { addr, hits })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Hit> {
        lock(&self.hits).clone()
    }

    pub fn last(&self) -> Option<Hit> {
        lock(&self.hits).last().cloned()
    }
}

async fn handle(State(state): State<MockState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let query = reqwest::Url::parse(&format!("http://mock{uri}"))
        .map(|u| u.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect())
        .unwrap_or_default();
    let hit = Hit {
        method: method.to_string(),
        path: uri.path().to_owned(),
        query,
        body: serde_json::from_slice(&body).ok(),
    };
    let (status, value) = (state.responder)(&hit);
    lock(&state.hits).push(hit);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if value.is_null() { String::new() } else { value.to_string() };
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| status.into_response())
}

/// Context with a static env token aimed at `api`, merchant `M1`, no pauses.
pub fn api_context(dir: &tempfile::TempDir, api: &MockApi, format: OutputFormat) -> anyhow::Result<Context> {
    let url = api.url();
    let env = env_with(
        dir,
        &[("CLOVER_ACCESS_TOKEN", "tok"), ("CLOVER_MERCHANT_ID", "M1"), ("CLOVER_API_URL", &url)],
    );
    let mut ctx = Context::new(env, None, format)?;
    ctx.page_pause = Duration::ZERO;
    ctx.retry = RetryPolicy { max_retries: 1, base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(5) };
    Ok(ctx)
}

/// Captured stdout of a command.
pub fn text(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}
