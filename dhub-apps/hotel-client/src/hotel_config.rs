//!  Dhub Hotel Client
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Client Configuration
//!
//! Endpoint, deadlines and credentials. Values come from the process
//! environment, optionally seeded from a local `.env` file.

use crate::hotel_errors::{HotelApiError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dhub-mcp.mongoso.vip/dhub_mcp/mcp";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_KEY: &str = "X_API_KEY";
pub const ENV_SECRET_KEY: &str = "X_SECRET_KEY";
pub const ENV_BASE_URL: &str = "DHUB_MCP_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "DHUB_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "DHUB_REQUEST_TIMEOUT_SECS";

/// Load `.env` from the working directory (or a parent) into the process
/// environment. Variables already set are left untouched.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(non_empty_var)
    }

    /// Build from `DHUB_*` values supplied by `lookup`, defaults elsewhere.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(secs) = parse_secs(ENV_CONNECT_TIMEOUT, lookup(ENV_CONNECT_TIMEOUT))? {
            config.connect_timeout = secs;
        }
        if let Some(secs) = parse_secs(ENV_REQUEST_TIMEOUT, lookup(ENV_REQUEST_TIMEOUT))? {
            config.request_timeout = secs;
        }
        Ok(config)
    }
}

/// API key pair, passed explicitly with every remote call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        let secret_key = secret_key.into().trim().to_string();
        if api_key.is_empty() || secret_key.is_empty() {
            return Err(HotelApiError::Authentication(format!(
                "both {ENV_API_KEY} and {ENV_SECRET_KEY} must be set"
            )));
        }
        Ok(Self {
            api_key,
            secret_key,
        })
    }

    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::new(
            non_empty_var(ENV_API_KEY).unwrap_or_default(),
            non_empty_var(ENV_SECRET_KEY).unwrap_or_default(),
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(name: &str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|v| match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(HotelApiError::validation(format!(
                "{name} must be a positive number of seconds, got {v}"
            ))),
        })
        .transpose()
}
