// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token freshness and refresh-on-demand.
//!
//! The transport only sees the [`TokenProvider`] capability. Stored
//! credentials go through [`TokenManager`], which owns the
//! [`CredentialStore`] and is the only writer of refreshed tokens.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::Endpoints;
use crate::credential::store::CredentialStore;
use crate::credential::{epoch_ms, oauth, CredentialRecord};
use crate::error::{AuthError, ClientError};

/// Safety margin before the recorded expiry (5 minutes).
pub const EXPIRY_SKEW_MS: u64 = 5 * 60 * 1000;

/// Whether `record`'s access token should be treated as expired at `now_ms`.
///
/// A record without an expiry is never expired.
pub fn is_expired(record: &CredentialRecord, now_ms: u64) -> bool {
    match record.expires_at {
        Some(expires_at) => now_ms >= expires_at.saturating_sub(EXPIRY_SKEW_MS),
        None => false,
    }
}

/// Bearer token capability used by the transport.
pub trait TokenProvider: Send + Sync {
    /// Token for the next request. May refresh proactively.
    fn token(&self) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Called after a 401. Returns the replacement token.
    fn on_unauthorized(&self) -> impl Future<Output = Result<String, ClientError>> + Send;
}

/// Owns the credential store and performs refreshes against it.
pub struct TokenManager {
    store: Mutex<CredentialStore>,
    http: reqwest::Client,
    /// `CLOVER_API_URL`; replaces the record's regional token endpoint.
    api_override: Option<String>,
}

impl TokenManager {
    pub fn new(store: CredentialStore, http: reqwest::Client) -> Self {
        Self { store: Mutex::new(store), http, api_override: None }
    }

    pub fn with_api_override(mut self, url: Option<String>) -> Self {
        self.api_override = url;
        self
    }

    /// Lock the store for reads or administrative mutations.
    pub async fn store(&self) -> MutexGuard<'_, CredentialStore> {
        self.store.lock().await
    }

    pub fn into_store(self) -> CredentialStore {
        self.store.into_inner()
    }

    /// Endpoints for a stored merchant's region.
    pub fn endpoints_for(&self, record: &CredentialRecord) -> Endpoints {
        Endpoints::resolve(record.region, self.api_override.as_deref())
    }

    /// Access token for `merchant_id`, refreshed first when it is expired and
    /// a refresh token is available.
    pub async fn access_token(&self, merchant_id: &str) -> Result<String, ClientError> {
        {
            let store = self.store.lock().await;
            let record = store
                .get(Some(merchant_id))
                .ok_or_else(|| not_authenticated(merchant_id))?;
            if record.refresh_token.is_none() || !is_expired(record, epoch_ms()) {
                return Ok(record.access_token.clone());
            }
        }
        debug!(merchant = merchant_id, "access token expired, refreshing before use");
        self.refresh(merchant_id).await
    }

    /// Refresh `merchant_id`'s access token and persist the result.
    ///
    /// The store lock is held across the token call so refreshes within one
    /// process never interleave. Endpoint failures are returned unmodified.
    pub async fn refresh(&self, merchant_id: &str) -> Result<String, ClientError> {
        let mut store = self.store.lock().await;
        let record = store
            .get(Some(merchant_id))
            .cloned()
            .ok_or_else(|| not_authenticated(merchant_id))?;
        let refresh_token = record
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::NoRefreshToken { merchant: merchant_id.to_owned() })?;

        let endpoints = self.endpoints_for(&record);
        let token = oauth::request_refresh(
            &self.http,
            &endpoints.api_base,
            &record.client_id,
            &record.client_secret,
            &refresh_token,
        )
        .await?;

        let expires_at = token.expires_at(epoch_ms());
        store.update_tokens(
            merchant_id,
            token.access_token.clone(),
            token.refresh_token.clone(),
            expires_at,
        )?;
        info!(
            merchant = merchant_id,
            rotated = token.refresh_token.is_some(),
            expires_in = token.expires_in,
            "access token refreshed"
        );
        Ok(token.access_token)
    }
}

fn not_authenticated(merchant_id: &str) -> ClientError {
    AuthError::NotAuthenticated { merchant: Some(merchant_id.to_owned()) }.into()
}

/// Tokens for one merchant backed by the credential store.
#[derive(Clone)]
pub struct StoredToken {
    manager: Arc<TokenManager>,
    merchant_id: String,
}

impl StoredToken {
    pub fn new(manager: Arc<TokenManager>, merchant_id: impl Into<String>) -> Self {
        Self { manager, merchant_id: merchant_id.into() }
    }

    pub fn manager(&self) -> &Arc<TokenManager> {
        &self.manager
    }
}

impl TokenProvider for StoredToken {
    async fn token(&self) -> Result<String, ClientError> {
        self.manager.access_token(&self.merchant_id).await
    }

    async fn on_unauthorized(&self) -> Result<String, ClientError> {
        self.manager.refresh(&self.merchant_id).await
    }
}

/// A fixed token from `CLOVER_ACCESS_TOKEN`. It cannot be refreshed, so a
/// 401 is final.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, ClientError> {
        Ok(self.0.clone())
    }

    async fn on_unauthorized(&self) -> Result<String, ClientError> {
        Err(AuthError::Unauthorized.into())
    }
}

/// Either kind of token, chosen at start-up.
#[derive(Clone)]
pub enum TokenSource {
    Static(StaticToken),
    Stored(StoredToken),
}

impl TokenProvider for TokenSource {
    async fn token(&self) -> Result<String, ClientError> {
        match self {
            Self::Static(t) => t.token().await,
            Self::Stored(t) => t.token().await,
        }
    }

    async fn on_unauthorized(&self) -> Result<String, ClientError> {
        match self {
            Self::Static(t) => t.on_unauthorized().await,
            Self::Stored(t) => t.on_unauthorized().await,
        }
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
