// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-merchant OAuth credentials: persistence, store, token lifecycle.
//!
//! The store is loaded once per invocation, mutated in memory, and written
//! back in full after every mutation. The whole-file write is the only
//! synchronization boundary; two processes refreshing the same merchant can
//! still race on a rotated refresh token.

pub mod oauth;
pub mod persist;
pub mod store;
pub mod token;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::Region;

/// OAuth credentials for one merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as milliseconds since Unix epoch. Absent means long-lived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub region: Region,
}

/// On-disk shape of `config.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_merchant: Option<String>,
    /// Region of the most recent login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialRecord>,
}

/// Current wall-clock time as epoch milliseconds.
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
