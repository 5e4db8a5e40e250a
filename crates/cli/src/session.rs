// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation context: environment overrides, the credential store,
//! and an authenticated API client for the active merchant.

use std::sync::Arc;
use std::time::Duration;

use cloverapi::config::{config_path, Endpoints, EnvOverrides};
use cloverapi::credential::store::CredentialStore;
use cloverapi::credential::token::{StaticToken, StoredToken, TokenManager, TokenSource};
use cloverapi::fetch::{BulkFetcher, PAGE_PAUSE};
use cloverapi::transport::{RetryPolicy, Transport};
use cloverapi::AuthError;
use tracing::debug;

use crate::output::OutputFormat;

/// Authenticated client used by every API command.
pub type Client = Transport<TokenSource>;

pub struct Context {
    pub env: EnvOverrides,
    /// `--merchant`, when given.
    pub merchant: Option<String>,
    pub format: OutputFormat,
    pub http: reqwest::Client,
    pub retry: RetryPolicy,
    pub page_pause: Duration,
}

impl Context {
    pub fn new(env: EnvOverrides, merchant: Option<String>, format: OutputFormat) -> anyhow::Result<Self> {
        Ok(Self {
            env,
            merchant: merchant.filter(|m| !m.is_empty()),
            format,
            http: cloverapi::transport::http_client()?,
            retry: RetryPolicy::default(),
            page_pause: PAGE_PAUSE,
        })
    }

    pub fn store(&self) -> anyhow::Result<CredentialStore> {
        let path = config_path(&self.env)?;
        debug!(path = %path.display(), "loading credential store");
        Ok(CredentialStore::load(path).with_env_merchant(self.env.merchant_id.clone()))
    }

    /// Token manager over the store, honouring `CLOVER_API_URL`.
    pub fn token_manager(&self, store: CredentialStore) -> TokenManager {
        TokenManager::new(store, self.http.clone()).with_api_override(self.env.api_url.clone())
    }

    /// Client for the active merchant.
    ///
    /// `CLOVER_ACCESS_TOKEN` bypasses the store entirely; the merchant then
    /// comes from `--merchant` or `CLOVER_MERCHANT_ID`.
    pub fn client(&self) -> anyhow::Result<Client> {
        if let Some(token) = self.env.access_token.clone() {
            let merchant = self
                .merchant
                .clone()
                .or_else(|| self.env.merchant_id.clone())
                .ok_or(AuthError::NotAuthenticated { merchant: None })?;
            let region = self.env.region.unwrap_or_default();
            let endpoints = Endpoints::resolve(region, self.env.api_url.as_deref());
            debug!(merchant, %region, "using access token from environment");
            let client = Transport::new(
                self.http.clone(),
                endpoints.api_base,
                merchant,
                TokenSource::Static(StaticToken(token)),
            );
            return Ok(client.with_retry_policy(self.retry));
        }

        let store = self.store()?;
        let merchant = store
            .resolve_merchant(self.merchant.as_deref())
            .ok_or(AuthError::NotAuthenticated { merchant: None })?;
        let record = store
            .get(Some(&merchant))
            .cloned()
            .ok_or_else(|| AuthError::NotAuthenticated { merchant: Some(merchant.clone()) })?;

        let manager = Arc::new(self.token_manager(store));
        let endpoints = manager.endpoints_for(&record);
        debug!(merchant, region = %record.region, "using stored credentials");
        let provider = TokenSource::Stored(StoredToken::new(manager, merchant.clone()));
        Ok(Transport::new(self.http.clone(), endpoints.api_base, merchant, provider).with_retry_policy(self.retry))
    }

    pub fn fetcher<'a>(&self, client: &'a Client) -> BulkFetcher<'a, Client> {
        BulkFetcher::new(client).with_page_pause(self.page_pause)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
