// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth token endpoint calls: authorization-code exchange and refresh.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Absolute expiry in epoch milliseconds, relative to `now_ms`.
    ///
    /// A lifetime too large to represent is treated like an absent one.
    pub fn expires_at(&self, now_ms: u64) -> Option<u64> {
        self.expires_in
            .filter(|s| *s > 0)
            .and_then(|s| s.checked_mul(1000))
            .and_then(|ms| now_ms.checked_add(ms))
    }
}

/// Browser URL that starts the authorization-code flow.
pub fn authorize_url(
    auth_base: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, TransportError> {
    let base = format!("{}/oauth/v2/authorize", auth_base.trim_end_matches('/'));
    Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("state", state),
        ],
    )
    .map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    client: &reqwest::Client,
    api_base: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenResponse, TransportError> {
    post_token(
        client,
        api_base,
        "/oauth/v2/token",
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

/// Trade a refresh token for a new access token.
pub async fn request_refresh(
    client: &reqwest::Client,
    api_base: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, TransportError> {
    post_token(
        client,
        api_base,
        "/oauth/v2/refresh",
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

async fn post_token(
    client: &reqwest::Client,
    api_base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, TransportError> {
    let base = format!("{}{path}", api_base.trim_end_matches('/'));
    let url = Url::parse_with_params(&base, params)
        .map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;

    let resp = client.post(url).send().await?;
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Http { status, body });
    }

    let token: TokenResponse = resp.json().await?;
    Ok(token)
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
