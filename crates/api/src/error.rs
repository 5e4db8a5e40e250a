// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Credential problems. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable credential resolves for the active merchant.
    NotAuthenticated { merchant: Option<String> },
    /// A refresh was attempted but the stored record has no refresh token.
    NoRefreshToken { merchant: String },
    /// A second 401 after one refresh and retry.
    Unauthorized,
}

impl AuthError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated { .. } => "NOT_AUTHENTICATED",
            Self::NoRefreshToken { .. } => "NO_REFRESH_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated { merchant: Some(m) } => {
                write!(f, "no credentials for merchant {m}; run `clovercli auth login` first")
            }
            Self::NotAuthenticated { merchant: None } => f.write_str(
                "no merchant selected; use --merchant, set CLOVER_MERCHANT_ID, or run `clovercli auth login`",
            ),
            Self::NoRefreshToken { merchant } => {
                write!(f, "no refresh token stored for merchant {merchant}; log in again")
            }
            Self::Unauthorized => f.write_str(
                "credential rejected after refresh (revoked, wrong region, or wrong client secret)",
            ),
        }
    }
}

impl std::error::Error for AuthError {}

/// Failures talking to the API.
#[derive(Debug)]
pub enum TransportError {
    /// 429 retries exhausted.
    RateLimited { attempts: u32 },
    /// Any other non-2xx response.
    Http { status: u16, body: String },
    /// Connection, timeout, or TLS failure.
    Network(reqwest::Error),
    /// A 2xx body that could not be decoded.
    Decode(String),
    /// A path or base URL that does not form a valid URL.
    InvalidUrl(String),
}

impl TransportError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Http { .. } => "HTTP",
            Self::Network(_) => "NETWORK",
            Self::Decode(_) => "DECODE",
            Self::InvalidUrl(_) => "INVALID_URL",
        }
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited { attempts } => {
                write!(f, "rate limited by the API after {attempts} attempts")
            }
            Self::Http { status, body } if body.is_empty() => write!(f, "API returned {status}"),
            Self::Http { status, body } => write!(f, "API returned {status}: {body}"),
            Self::Network(e) => write!(f, "request failed: {e}"),
            Self::Decode(msg) => write!(f, "invalid response: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

/// Problems with the persisted credential file.
///
/// Load-time failures are recovered locally (treated as an empty store);
/// only write failures reach callers.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// No usable config directory could be resolved.
    NoConfigDir,
}

impl ConfigError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Io(_) => "CONFIG_IO",
            Self::Parse(_) => "CONFIG_PARSE",
            Self::NoConfigDir => "NO_CONFIG_DIR",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "credential file: {e}"),
            Self::Parse(e) => write!(f, "credential file is not valid JSON: {e}"),
            Self::NoConfigDir => f.write_str("cannot determine a config directory (set CLOVER_CONFIG_DIR)"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::NoConfigDir => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Umbrella error returned by the transport and the bulk fetcher.
#[derive(Debug)]
pub enum ClientError {
    Auth(AuthError),
    Transport(TransportError),
    Config(ConfigError),
}

impl ClientError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.as_str(),
            Self::Transport(e) => e.as_str(),
            Self::Config(e) => e.as_str(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => fmt::Display::fmt(e, f),
            Self::Transport(e) => fmt::Display::fmt(e, f),
            Self::Config(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ConfigError> for ClientError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.into())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
