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

//! # Hotel API Errors
//!
//! Every failure surfaced by the client is one of these variants. Remote
//! tool errors arrive as free text, so they are sorted into a variant by
//! keyword.

use rmcp::ServiceError;
use rmcp::model::ErrorCode;
use thiserror::Error;

pub type Result<T, E = HotelApiError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotelApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl HotelApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short category name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Timeout(_) => "timeout",
            Self::Connection(_) => "connection",
            Self::Upstream(_) => "upstream",
        }
    }

    /// Sort an error message reported by the remote service into a variant.
    pub fn from_remote_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let matches = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
        let has_code = |codes: &[&str]| {
            lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| codes.contains(&token))
        };

        if matches(AUTH_MARKERS) || has_code(AUTH_STATUS_CODES) {
            Self::Authentication(message.to_string())
        } else if matches(NOT_FOUND_MARKERS) || has_code(NOT_FOUND_STATUS_CODES) {
            Self::NotFound(message.to_string())
        } else if matches(VALIDATION_MARKERS) {
            Self::Validation(message.to_string())
        } else {
            Self::Upstream(message.to_string())
        }
    }
}

const AUTH_MARKERS: &[&str] = &[
    "auth",
    "api key",
    "api_key",
    "secret",
    "unauthorized",
    "forbidden",
    "密钥",
    "认证",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "not exist",
    "unknown hotel",
    "不存在",
    "未找到",
];

// Matched as whole tokens so hotel ids like 14015 do not trip them.
const AUTH_STATUS_CODES: &[&str] = &["401", "403"];
const NOT_FOUND_STATUS_CODES: &[&str] = &["404"];

const VALIDATION_MARKERS: &[&str] = &["invalid", "validation", "must be", "参数"];

impl From<ServiceError> for HotelApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::McpError(data) => {
                let message = data.message.to_string();
                if data.code == ErrorCode::INVALID_PARAMS {
                    Self::Validation(message)
                } else if data.code == ErrorCode::METHOD_NOT_FOUND {
                    Self::NotFound(message)
                } else {
                    Self::from_remote_message(&message)
                }
            }
            ServiceError::Timeout { timeout } => {
                Self::Timeout(format!("no response within {timeout:?}"))
            }
            other => Self::Connection(other.to_string()),
        }
    }
}
