// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated HTTP transport.
//!
//! Each logical request is a small state machine: one token refresh is
//! allowed after a 401, and 429s are retried with backoff until the
//! [`RetryPolicy`] budget is spent.

pub mod retry;

use std::sync::Once;

use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::HTTP_TIMEOUT;
use crate::credential::token::TokenProvider;
use crate::error::{AuthError, ClientError, TransportError};
use crate::fetch::PageSource;

pub use retry::{parse_retry_after, RateLimitState, RetryPolicy};

/// Placeholder replaced by the active merchant id in request paths.
pub const MERCHANT_PLACEHOLDER: &str = "{mId}";

static CRYPTO: Once = Once::new();

/// Install the ring crypto provider for rustls. Safe to call repeatedly.
pub fn ensure_crypto() {
    CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Shared HTTP client with the default request timeout.
pub fn http_client() -> Result<reqwest::Client, TransportError> {
    ensure_crypto();
    reqwest::Client::builder().timeout(HTTP_TIMEOUT).build().map_err(TransportError::Network)
}

/// Authenticated client for one merchant.
pub struct Transport<P> {
    http: reqwest::Client,
    api_base: String,
    merchant_id: String,
    provider: P,
    retry: RetryPolicy,
}

impl<P: TokenProvider> Transport<P> {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        merchant_id: impl Into<String>,
        provider: P,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_owned();
        Self { http, api_base, merchant_id: merchant_id.into(), provider, retry: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Substitute the merchant id and make the path absolute.
    pub fn resolve_path(&self, path: &str) -> String {
        let path = path.replace(MERCHANT_PLACEHOLDER, &self.merchant_id);
        if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        }
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.api_base, self.resolve_path(path));
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Issue one logical request and decode its JSON body.
    ///
    /// An empty 2xx body decodes to [`Value::Null`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = self.url(path, query)?;
        let mut token = self.provider.token().await?;
        let mut refreshed = false;
        let mut limiter = RateLimitState::new(self.retry);

        loop {
            debug!(%method, path = url.path(), "sending request");
            let mut req = self.http.request(method.clone(), url.clone()).bearer_auth(&token);
            if let Some(body) = body {
                req = req.json(body);
            }
            let resp = req.send().await?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED {
                if refreshed {
                    return Err(AuthError::Unauthorized.into());
                }
                debug!(path = url.path(), "401, refreshing token and retrying once");
                token = self.provider.on_unauthorized().await?;
                refreshed = true;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after);
                match limiter.next_delay(retry_after) {
                    Some(delay) => {
                        warn!(
                            path = url.path(),
                            attempt = limiter.attempts() - 1,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => {
                        return Err(TransportError::RateLimited { attempts: limiter.attempts() }.into())
                    }
                }
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(TransportError::Http { status: status.as_u16(), body }.into());
            }

            let bytes = resp.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes)
                .map_err(|e| TransportError::Decode(e.to_string()).into());
        }
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// GET and decode into a typed model.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let value = self.get(path, query).await?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()).into())
    }
}

impl<P: TokenProvider> PageSource for Transport<P> {
    async fn fetch_page(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<Value>, ClientError> {
        let mut value = self.get(path, query).await?;
        match value.get_mut("elements").map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => {
                // Treated as a final empty page.
                warn!(path, "list response has no elements array");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
