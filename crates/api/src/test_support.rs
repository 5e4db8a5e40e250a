// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mock API server for unit tests.
//!
//! Every request is recorded; responses come from a caller-supplied
//! responder or from per-path scripts that repeat their last entry.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Region;
use crate::credential::store::CredentialStore;
use crate::credential::CredentialRecord;

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(&'static str, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, body: body.to_string(), headers: vec![] }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: String::new(), headers: vec![] }
    }

    /// `{ "elements": [...] }` list envelope.
    pub fn elements(items: Vec<serde_json::Value>) -> Self {
        Self::json(200, serde_json::json!({ "elements": items }))
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
}

impl Recorded {
    fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let query = reqwest::Url::parse(&format!("http://mock{uri}"))
            .map(|u| u.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect())
            .unwrap_or_default();
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        Self { method: method.to_string(), path: uri.path().to_owned(), query, bearer }
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// All values of a repeated query parameter.
    pub fn params(&self, name: &str) -> Vec<&str> {
        self.query.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str()).collect()
    }
}

type Responder = Arc<dyn Fn(&Recorded) -> MockResponse + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    log: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockServer {
    pub async fn start(
        responder: impl Fn(&Recorded) -> MockResponse + Send + Sync + 'static,
    ) -> anyhow::Result<Self> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { responder: Arc::new(responder), log: Arc::clone(&log) };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self { addr, log })
    }

    /// Per-path response scripts. Each path repeats its last response; unknown
    /// paths get 404.
    pub async fn scripted(routes: Vec<(&str, Vec<MockResponse>)>) -> anyhow::Result<Self> {
        let scripts: HashMap<String, VecDeque<MockResponse>> =
            routes.into_iter().map(|(p, r)| (p.to_owned(), r.into())).collect();
        let scripts = Mutex::new(scripts);
        Self::start(move |req| {
            let mut scripts = lock(&scripts);
            match scripts.get_mut(&req.path) {
                Some(queue) if queue.len() > 1 => {
                    queue.pop_front().unwrap_or_else(|| MockResponse::status(500))
                }
                Some(queue) => queue.front().cloned().unwrap_or_else(|| MockResponse::status(500)),
                None => MockResponse::status(404),
            }
        })
        .await
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        lock(&self.log).clone()
    }

    /// Number of requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        lock(&self.log).iter().filter(|r| r.path == path).count()
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let recorded = Recorded::from_parts(&method, &uri, &headers);
    let resp = (state.responder)(&recorded);
    lock(&state.log).push(recorded);

    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status).header("content-type", "application/json");
    for (name, value) in resp.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(resp.body)).unwrap_or_else(|_| status.into_response())
}

/// Credential record pointing at nothing in particular.
pub fn record(access: &str, refresh: Option<&str>, expires_at: Option<u64>) -> CredentialRecord {
    CredentialRecord {
        client_id: "cid".into(),
        client_secret: "secret".into(),
        access_token: access.into(),
        refresh_token: refresh.map(str::to_owned),
        expires_at,
        region: Region::Us,
    }
}

/// A store in a fresh temp dir holding one merchant.
pub fn store_with(
    merchant: &str,
    record: CredentialRecord,
) -> anyhow::Result<(tempfile::TempDir, CredentialStore)> {
    let dir = tempfile::tempdir()?;
    let mut store = CredentialStore::load(dir.path().join("config.json"));
    store.put(merchant, record)?;
    Ok((dir, store))
}
