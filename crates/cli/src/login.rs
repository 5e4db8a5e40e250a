// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser-based OAuth login.
//!
//! A short-lived listener on `127.0.0.1:<port>` receives the authorization
//! redirect, exchanges the code for tokens, answers the browser, and shuts
//! down. Exactly one callback completes the attempt, successfully or not.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use cloverapi::config::{Endpoints, Region};
use cloverapi::credential::oauth::{self, TokenResponse};
use cloverapi::credential::{epoch_ms, CredentialRecord};
use cloverapi::TransportError;
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_PORT: u16 = 8089;

pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// How long to wait for in-flight responses after the callback completes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum LoginError {
    Bind { port: u16, source: std::io::Error },
    InvalidUrl(TransportError),
    /// The provider redirected back with `error=...`.
    Denied(String),
    MissingParams,
    StateMismatch,
    /// The token endpoint rejected the code (e.g. wrong region).
    Exchange(TransportError),
    TimedOut,
    /// The listener stopped without delivering a result.
    Aborted,
}

impl LoginError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "BIND",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Denied(_) => "DENIED",
            Self::MissingParams => "MISSING_PARAMS",
            Self::StateMismatch => "STATE_MISMATCH",
            Self::Exchange(_) => "EXCHANGE_FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { port, source } => write!(f, "cannot listen on port {port}: {source}"),
            Self::InvalidUrl(e) => write!(f, "cannot build authorize URL: {e}"),
            Self::Denied(reason) => write!(f, "authorization denied: {reason}"),
            Self::MissingParams => f.write_str("callback is missing code or merchant_id"),
            Self::StateMismatch => f.write_str("callback state does not match this login attempt"),
            Self::Exchange(e) => write!(f, "token exchange failed (check --region and client secret): {e}"),
            Self::TimedOut => f.write_str("timed out waiting for the OAuth callback"),
            Self::Aborted => f.write_str("callback listener stopped unexpectedly"),
        }
    }
}

impl std::error::Error for LoginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::InvalidUrl(e) | Self::Exchange(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginParams {
    pub client_id: String,
    pub client_secret: String,
    pub region: Region,
    /// 0 picks a free port.
    pub port: u16,
    pub api_override: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub merchant_id: String,
    pub record: CredentialRecord,
}

type CallbackResult = Result<(String, TokenResponse), LoginError>;

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    http: reqwest::Client,
    api_base: Arc<str>,
    client_id: Arc<str>,
    client_secret: Arc<str>,
    reply: Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>,
}

/// Run one login attempt. `on_url` receives the authorize URL once the
/// listener is ready.
pub async fn login(
    params: &LoginParams,
    http: &reqwest::Client,
    on_url: impl FnOnce(&Url),
) -> Result<LoginOutcome, LoginError> {
    let listener = TcpListener::bind(("127.0.0.1", params.port))
        .await
        .map_err(|source| LoginError::Bind { port: params.port, source })?;
    let port = listener
        .local_addr()
        .map_err(|source| LoginError::Bind { port: params.port, source })?
        .port();

    let redirect_uri = format!("http://localhost:{port}/callback");
    let endpoints = Endpoints::resolve(params.region, params.api_override.as_deref());
    let state = uuid::Uuid::new_v4().to_string();
    let url = oauth::authorize_url(&endpoints.auth_base, &params.client_id, &redirect_uri, &state)
        .map_err(LoginError::InvalidUrl)?;

    let (tx, rx) = oneshot::channel();
    let app = Router::new().route("/callback", get(callback)).with_state(CallbackState {
        expected_state: state.into(),
        http: http.clone(),
        api_base: endpoints.api_base.into(),
        client_id: params.client_id.as_str().into(),
        client_secret: params.client_secret.as_str().into(),
        reply: Arc::new(Mutex::new(Some(tx))),
    });

    let shutdown = CancellationToken::new();
    let server = {
        let sd = shutdown.clone();
        tokio::spawn(async move { axum::serve(listener, app).with_graceful_shutdown(sd.cancelled_owned()).await })
    };

    info!(port, region = %params.region, "waiting for OAuth callback");
    on_url(&url);

    let received = tokio::time::timeout(params.timeout, rx).await;
    shutdown.cancel();
    match tokio::time::timeout(DRAIN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => debug!("callback listener stopped"),
        Ok(Ok(Err(e))) => warn!(err = %e, "callback listener error"),
        Ok(Err(e)) => warn!(err = %e, "callback listener task failed"),
        Err(_) => warn!("callback listener did not drain in time"),
    }

    let (merchant_id, token) = match received {
        Err(_) => return Err(LoginError::TimedOut),
        Ok(Err(_)) => return Err(LoginError::Aborted),
        Ok(Ok(result)) => result?,
    };

    info!(merchant = %merchant_id, "login complete");
    let record = CredentialRecord {
        client_id: params.client_id.clone(),
        client_secret: params.client_secret.clone(),
        expires_at: token.expires_at(epoch_ms()),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        region: params.region,
    };
    Ok(LoginOutcome { merchant_id, record })
}

async fn callback(
    State(st): State<CallbackState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    let result = complete(&st, &query).await;
    let (status, page) = match &result {
        Ok((merchant, _)) => (
            StatusCode::OK,
            page("Authentication successful", &format!("Merchant {merchant} is authorized. You can close this window.")),
        ),
        Err(e @ LoginError::Exchange(_)) => (StatusCode::BAD_GATEWAY, page("Authentication failed", &e.to_string())),
        Err(e) => (StatusCode::BAD_REQUEST, page("Authentication failed", &e.to_string())),
    };
    match st.reply.lock().await.take() {
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => debug!("ignoring callback after login completed"),
    }
    (status, Html(page))
}

async fn complete(st: &CallbackState, query: &HashMap<String, String>) -> CallbackResult {
    let param = |name: &str| query.get(name).map(String::as_str).filter(|v| !v.is_empty());

    if let Some(error) = param("error") {
        return Err(LoginError::Denied(error.to_owned()));
    }
    let (Some(code), Some(merchant)) = (param("code"), param("merchant_id")) else {
        return Err(LoginError::MissingParams);
    };
    if param("state") != Some(&*st.expected_state) {
        return Err(LoginError::StateMismatch);
    }

    let token = oauth::exchange_code(&st.http, &st.api_base, &st.client_id, &st.client_secret, code)
        .await
        .map_err(LoginError::Exchange)?;
    Ok((merchant.to_owned(), token))
}

fn page(title: &str, message: &str) -> String {
    format!(
        "<!doctype html><html><head><title>clovercli</title></head><body><h1>{}</h1><p>{}</p></body></html>",
        escape(title),
        escape(message)
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
