// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regions, endpoint resolution, environment overrides, and the config path.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the credential file inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Timeout applied to every outbound HTTP call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// API deployment a merchant lives in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Eu,
    La,
    Sandbox,
}

impl Region {
    pub const ALL: [Region; 4] = [Self::Us, Self::Eu, Self::La, Self::Sandbox];

    /// Base URL for REST and OAuth token calls.
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Us => "https://api.clover.com",
            Self::Eu => "https://api.eu.clover.com",
            Self::La => "https://api.la.clover.com",
            Self::Sandbox => "https://apisandbox.dev.clover.com",
        }
    }

    /// Base URL for the browser-facing authorize page.
    pub fn auth_url(&self) -> &'static str {
        match self {
            Self::Us => "https://www.clover.com",
            Self::Eu => "https://www.eu.clover.com",
            Self::La => "https://www.la.clover.com",
            Self::Sandbox => "https://sandbox.dev.clover.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::La => "la",
            Self::Sandbox => "sandbox",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" | "na" => Ok(Self::Us),
            "eu" => Ok(Self::Eu),
            "la" => Ok(Self::La),
            "sandbox" | "dev" => Ok(Self::Sandbox),
            other => Err(format!("invalid region: {other} (expected us, eu, la, or sandbox)")),
        }
    }
}

/// Base URLs used for one merchant's calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub auth_base: String,
}

impl Endpoints {
    /// Region defaults, with `api_override` (from `CLOVER_API_URL`) replacing both bases.
    pub fn resolve(region: Region, api_override: Option<&str>) -> Self {
        match api_override {
            Some(url) => {
                let base = url.trim_end_matches('/').to_owned();
                Self { api_base: base.clone(), auth_base: base }
            }
            None => Self {
                api_base: region.api_url().to_owned(),
                auth_base: region.auth_url().to_owned(),
            },
        }
    }
}

/// Values read from `CLOVER_*` environment variables.
///
/// `access_token` and `merchant_id` bypass the credential store entirely
/// when present.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvOverrides {
    pub access_token: Option<String>,
    pub merchant_id: Option<String>,
    pub region: Option<Region>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
    pub config_dir: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Inner implementation that accepts a lookup function for testability.
    ///
    /// Empty values count as unset. An unparseable `CLOVER_REGION` is logged
    /// and ignored.
    pub fn from_lookup(get_env: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| get_env(name).filter(|v| !v.trim().is_empty());
        let region = get("CLOVER_REGION").and_then(|r| match r.parse::<Region>() {
            Ok(region) => Some(region),
            Err(e) => {
                tracing::warn!(err = %e, "ignoring CLOVER_REGION");
                None
            }
        });
        Self {
            access_token: get("CLOVER_ACCESS_TOKEN"),
            merchant_id: get("CLOVER_MERCHANT_ID"),
            region,
            client_id: get("CLOVER_CLIENT_ID"),
            client_secret: get("CLOVER_CLIENT_SECRET"),
            api_url: get("CLOVER_API_URL"),
            config_dir: get("CLOVER_CONFIG_DIR").map(PathBuf::from),
        }
    }
}

/// Resolve the directory holding `config.json`.
///
/// Checks `CLOVER_CONFIG_DIR`, then `%APPDATA%\clovercli` on Windows, then
/// `$XDG_CONFIG_HOME/clovercli`, then `$HOME/.config/clovercli`.
pub fn config_dir(overrides: &EnvOverrides) -> Result<PathBuf, ConfigError> {
    config_dir_with(overrides, |name| std::env::var(name).ok())
}

pub(crate) fn config_dir_with(
    overrides: &EnvOverrides,
    get_env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, ConfigError> {
    if let Some(ref dir) = overrides.config_dir {
        return Ok(dir.clone());
    }
    if cfg!(windows) {
        if let Some(appdata) = get_env("APPDATA") {
            return Ok(PathBuf::from(appdata).join("clovercli"));
        }
    }
    if let Some(xdg) = get_env("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("clovercli"));
    }
    if let Some(home) = get_env("HOME").or_else(|| get_env("USERPROFILE")) {
        return Ok(PathBuf::from(home).join(".config").join("clovercli"));
    }
    Err(ConfigError::NoConfigDir)
}

/// Full path of the credential file.
pub fn config_path(overrides: &EnvOverrides) -> Result<PathBuf, ConfigError> {
    Ok(config_dir(overrides)?.join(CONFIG_FILE))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
