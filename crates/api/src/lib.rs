// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloverapi: credential lifecycle and bulk data access for the merchant API.
//!
//! Layering, leaves first: [`credential::store`] persists per-merchant OAuth
//! records, [`credential::token`] keeps the bearer token fresh,
//! [`transport`] issues authenticated calls with refresh-on-401 and
//! backoff-on-429, and [`fetch`] pages and windows list endpoints.

pub mod config;
pub mod credential;
pub mod error;
pub mod fetch;
pub mod models;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AuthError, ClientError, ConfigError, TransportError};
