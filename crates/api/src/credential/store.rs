// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: merchant id → record, plus one default merchant.

use std::path::{Path, PathBuf};

use crate::config::Region;
use crate::credential::{persist, CredentialRecord, StoreFile};
use crate::error::ConfigError;

/// Durable per-merchant credentials.
///
/// Every mutation is written through to disk before returning; there is no
/// write-behind.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    file: StoreFile,
    /// `CLOVER_MERCHANT_ID`, consulted before the stored default.
    env_merchant: Option<String>,
}

impl CredentialStore {
    /// Load the store at `path`. Missing or corrupt files yield an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = persist::load(&path);
        Self { path, file, env_merchant: None }
    }

    /// Set the environment-supplied merchant override.
    pub fn with_env_merchant(mut self, merchant: Option<String>) -> Self {
        self.env_merchant = merchant;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole store to disk atomically.
    pub fn save(&self) -> Result<(), ConfigError> {
        persist::save(&self.path, &self.file)
    }

    /// Resolve which merchant a call applies to: explicit id, then the
    /// environment override, then the stored default.
    pub fn resolve_merchant(&self, merchant_id: Option<&str>) -> Option<String> {
        merchant_id
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .or_else(|| self.env_merchant.clone())
            .or_else(|| self.file.default_merchant.clone())
    }

    /// Record for the resolved merchant, if one is stored.
    pub fn get(&self, merchant_id: Option<&str>) -> Option<&CredentialRecord> {
        let id = self.resolve_merchant(merchant_id)?;
        self.file.credentials.get(&id)
    }

    /// Insert or replace a record. The first merchant stored becomes the default.
    pub fn put(&mut self, merchant_id: &str, record: CredentialRecord) -> Result<(), ConfigError> {
        self.file.region = Some(record.region);
        self.file.credentials.insert(merchant_id.to_owned(), record);
        if self.file.default_merchant.is_none() {
            self.file.default_merchant = Some(merchant_id.to_owned());
        }
        self.save()
    }

    /// Replace the token fields of an existing record in place.
    ///
    /// Client id, secret, and region are preserved. A `None` refresh token
    /// keeps the stored one (the API does not always rotate it). Returns
    /// `false` when no record exists for `merchant_id`.
    pub fn update_tokens(
        &mut self,
        merchant_id: &str,
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<u64>,
    ) -> Result<bool, ConfigError> {
        let Some(record) = self.file.credentials.get_mut(merchant_id) else {
            return Ok(false);
        };
        record.access_token = access_token;
        if refresh_token.is_some() {
            record.refresh_token = refresh_token;
        }
        if expires_at.is_some() {
            record.expires_at = expires_at;
        }
        self.save()?;
        Ok(true)
    }

    /// Delete a record. If it was the default, another remaining merchant
    /// becomes the default, or the default is cleared when none remain.
    pub fn remove(&mut self, merchant_id: &str) -> Result<bool, ConfigError> {
        let existed = self.file.credentials.remove(merchant_id).is_some();
        if self.file.default_merchant.as_deref() == Some(merchant_id) {
            self.file.default_merchant = self.file.credentials.keys().next().cloned();
        }
        self.save()?;
        Ok(existed)
    }

    /// Overwrite the default pointer. Existence is not checked here.
    pub fn set_default(&mut self, merchant_id: &str) -> Result<(), ConfigError> {
        self.file.default_merchant = Some(merchant_id.to_owned());
        self.save()
    }

    /// All stored merchant ids.
    pub fn list(&self) -> Vec<String> {
        self.file.credentials.keys().cloned().collect()
    }

    pub fn contains(&self, merchant_id: &str) -> bool {
        self.file.credentials.contains_key(merchant_id)
    }

    pub fn default_merchant(&self) -> Option<&str> {
        self.file.default_merchant.as_deref()
    }

    /// Region of the most recent login.
    pub fn region(&self) -> Option<Region> {
        self.file.region
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
