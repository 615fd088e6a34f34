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

//! # Dhub MCP Session
//!
//! Effectful (time, network) operations against the Dhub MCP endpoint.
//!
//! ```ignore
//! let client = HotelApiClient::default();
//! let session = client.connect().await?;
//! let creds = Credentials::from_env()?;
//! let stay = StayWindow::parse("2025-12-01", "2025-12-03")?;
//! let hotels = session
//!     .search_hotels_by_hotel_name(&creds, "Tokyo", stay, SearchFilters::default())
//!     .await?;
//! session.close().await?;
//! ```

use crate::hotel_config::{ClientConfig, Credentials};
use crate::hotel_errors::{HotelApiError, Result};
use crate::hotel_requests::{
    AddressSearch, GeoPoint, HotelDetailsRequest, HotelId, Language, NameSearch, Occupancy,
    PriceCheckRequest, SearchFilters, StayWindow, ToolRequest,
};
use rmcp::model::{CallToolRequestParam, CallToolResult, ClientInfo};
use rmcp::service::RunningService;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// A tool advertised by the remote server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct HotelApiClient {
    config: ClientConfig,
}

impl HotelApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ClientConfig::with_base_url(base_url))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a session. The session is released on `close()` or when dropped.
    pub async fn connect(&self) -> Result<HotelSession> {
        let url = self.config.base_url.as_str();
        tracing::info!("Connecting to MCP server: {}", url);
        if url.trim_end_matches('/').ends_with("/sse") {
            tracing::warn!("SSE endpoint configured; only streamable HTTP is supported, use /mcp");
        }

        let transport = StreamableHttpClientTransport::from_uri(url);
        let service = tokio::time::timeout(self.config.connect_timeout, client_info().serve(transport))
            .await
            .map_err(|_| {
                HotelApiError::Timeout(format!(
                    "handshake with {url} took longer than {:?}",
                    self.config.connect_timeout
                ))
            })?
            .map_err(|e| HotelApiError::Connection(format!("handshake with {url} failed: {e}")))?;

        let server_name = service
            .peer_info()
            .map(|info| info.server_info.name.clone())
            .unwrap_or_default();
        tracing::info!("Connected to MCP server {}", server_name);

        let tools = match tokio::time::timeout(self.config.request_timeout, service.list_all_tools())
            .await
        {
            Ok(Ok(tools)) => tools
                .into_iter()
                .map(|t| ToolInfo {
                    name: t.name.to_string(),
                    description: t.description.as_deref().unwrap_or_default().to_string(),
                })
                .collect(),
            Ok(Err(e)) => {
                tracing::error!("Failed to list tools: {}", e);
                Vec::new()
            }
            Err(_) => {
                tracing::error!("Listing tools timed out");
                Vec::new()
            }
        };
        tracing::info!("Available tools: {}", tools.len());
        for tool in &tools {
            tracing::info!("  - {}: {}", tool.name, tool.description);
        }

        Ok(HotelSession {
            service,
            tools,
            server_name,
            request_timeout: self.config.request_timeout,
        })
    }
}

fn client_info() -> ClientInfo {
    let mut info = ClientInfo::default();
    info.client_info.name = env!("CARGO_PKG_NAME").to_string();
    info.client_info.version = env!("CARGO_PKG_VERSION").to_string();
    info
}

/// An open connection to the Dhub MCP server.
///
/// Methods take `&self`, so one session can serve concurrent calls.
pub struct HotelSession {
    service: RunningService<RoleClient, ClientInfo>,
    tools: Vec<ToolInfo>,
    server_name: String,
    request_timeout: Duration,
}

impl HotelSession {
    pub fn available_tools(&self) -> &[ToolInfo] {
        &self.tools
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Gracefully end the session.
    pub async fn close(self) -> Result<()> {
        let reason = self
            .service
            .cancel()
            .await
            .map_err(|e| HotelApiError::Connection(format!("session shutdown failed: {e}")))?;
        tracing::info!("Disconnected from MCP server: {:?}", reason);
        Ok(())
    }

    /// Invoke a remote tool and return its text output unchanged.
    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        tracing::info!("Calling tool: {}", name);
        let shown = serde_json::Value::Object(redact_secrets(&arguments));
        tracing::debug!("Arguments: {}", shown);
        if !self.tools.is_empty() && !self.has_tool(name) {
            tracing::warn!("Tool {} was not advertised by the server", name);
        }

        let param = tool_call_param(name, arguments)?;
        let outcome = match tokio::time::timeout(self.request_timeout, self.service.call_tool(param))
            .await
        {
            Ok(Ok(result)) => tool_output(&result),
            Ok(Err(e)) => Err(HotelApiError::from(e)),
            Err(_) => Err(HotelApiError::Timeout(format!(
                "{name} gave no response within {:?}",
                self.request_timeout
            ))),
        };
        if let Err(e) = &outcome {
            tracing::error!("Tool {} failed ({}): {}", name, e.kind(), e);
        }
        outcome
    }

    /// Validate and send a typed request.
    pub async fn send<R: ToolRequest>(&self, credentials: &Credentials, request: &R) -> Result<String> {
        let today = chrono::Local::now().date_naive();
        for note in request.advisories(today) {
            tracing::warn!("{}: {}", R::TOOL_NAME, note);
        }
        let arguments = request.to_arguments(credentials)?;
        self.call_tool(R::TOOL_NAME, arguments).await
    }

    pub async fn search_hotels_by_address(
        &self,
        credentials: &Credentials,
        location: GeoPoint,
        stay: StayWindow,
        filters: SearchFilters,
    ) -> Result<String> {
        let request = AddressSearch::new(location, stay).filters(filters);
        self.send(credentials, &request).await
    }

    pub async fn search_hotels_by_hotel_name(
        &self,
        credentials: &Credentials,
        keyword: &str,
        stay: StayWindow,
        filters: SearchFilters,
    ) -> Result<String> {
        let request = NameSearch::new(keyword, stay).filters(filters);
        self.send(credentials, &request).await
    }

    pub async fn get_hotel_details(
        &self,
        credentials: &Credentials,
        hotel_id: HotelId,
        language: Language,
        need_facility: bool,
    ) -> Result<String> {
        let request = HotelDetailsRequest::new(hotel_id)
            .language(language)
            .need_facility(need_facility);
        self.send(credentials, &request).await
    }

    pub async fn check_hotel_price(
        &self,
        credentials: &Credentials,
        hotel_id: HotelId,
        stay: StayWindow,
        occupancy: Occupancy,
        language: Language,
    ) -> Result<String> {
        let request = PriceCheckRequest::new(hotel_id, stay)
            .occupancy(occupancy)
            .language(language);
        self.send(credentials, &request).await
    }
}

fn tool_call_param(name: &str, arguments: Map<String, Value>) -> Result<CallToolRequestParam> {
    serde_json::from_value(json!({ "name": name, "arguments": arguments }))
        .map_err(|e| HotelApiError::validation(format!("cannot build {name} call: {e}")))
}

fn tool_output(result: &CallToolResult) -> Result<String> {
    let wire = serde_json::to_value(result)
        .map_err(|e| HotelApiError::Upstream(format!("unreadable tool result: {e}")))?;
    output_from_wire(&wire)
}

/// First text item of a `tools/call` result, or the whole result as JSON.
/// Results flagged `isError` become typed errors.
fn output_from_wire(wire: &Value) -> Result<String> {
    let text = wire
        .get("content")
        .and_then(Value::as_array)
        .and_then(|items| {
            items.iter().find_map(|item| match item.get("type").and_then(Value::as_str) {
                Some("text") => item.get("text").and_then(Value::as_str),
                _ => None,
            })
        });

    if wire.get("isError").and_then(Value::as_bool) == Some(true) {
        let message = text.unwrap_or("remote tool reported an error without details");
        return Err(HotelApiError::from_remote_message(message));
    }

    match text {
        Some(t) => Ok(t.to_string()),
        None => Ok(wire
            .get("structuredContent")
            .filter(|v| !v.is_null())
            .unwrap_or(wire)
            .to_string()),
    }
}

fn redact_secrets(arguments: &Map<String, Value>) -> Map<String, Value> {
    let mut shown = arguments.clone();
    if let Some(secret) = shown.get_mut("x_secret_key") {
        *secret = Value::String("<redacted>".to_string());
    }
    shown
}
