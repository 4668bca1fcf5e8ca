//! Tools exposing the network watchdog and screenshot gate.
//!
//! Every query tool first makes sure the focused target is being observed and
//! then reads that target's history. Missing data comes back as a placeholder
//! rather than an error; only screenshot failures are surfaced.

use async_trait::async_trait;
use base64::Engine;
use netwatch_core::{timeout_from_secs, Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::network::{format_stack_trace, DetailOptions, NetworkLogEntry, NetworkWatchdog, BODY_NOT_AVAILABLE};
use crate::screenshot::ScreenshotWatchdog;
use crate::{Tool, ToolContext, ToolSchema};

const NO_FOCUSED_TARGET: &str = "No focused browser target is available";
const NO_STACK: &str = "No stack trace captured for this request";

fn parse_request<T: DeserializeOwned>(params: &Value) -> Result<T> {
    let params = if params.is_null() { json!({}) } else { params.clone() };
    serde_json::from_value(params).map_err(|e| Error::Validation(e.to_string()))
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

fn not_found(target_id: &str, url_pattern: &str) -> Value {
    json!({
        "found": false,
        "target_id": target_id,
        "message": format!("No captured request matches '{}'", url_pattern),
    })
}

/// Attach the focused target if needed and find the newest entry matching
/// `url_pattern`. `Err` carries the placeholder response.
async fn lookup(network: &NetworkWatchdog, url_pattern: &str) -> std::result::Result<(String, NetworkLogEntry), Value> {
    let Some(target_id) = network.on_state_request().await else {
        return Err(json!({"found": false, "message": NO_FOCUSED_TARGET}));
    };
    match network.find_entry(&target_id, url_pattern) {
        Some(entry) => Ok((target_id, entry)),
        None => Err(not_found(&target_id, url_pattern)),
    }
}

// ─── check_network_traffic ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckNetworkTrafficRequest {
    pub resource_type: String,
    pub only_errors: bool,
    pub limit: usize,
}

impl Default for CheckNetworkTrafficRequest {
    fn default() -> Self {
        Self {
            resource_type: "XHR".to_string(),
            only_errors: false,
            limit: 20,
        }
    }
}

impl CheckNetworkTrafficRequest {
    pub fn validate(&self) -> Result<()> {
        check_range("limit", self.limit, 1, 200)
    }

    /// The most recent `limit` matching entries, oldest first.
    pub fn select<'a>(&self, entries: &'a [NetworkLogEntry]) -> Vec<&'a NetworkLogEntry> {
        let mut matched: Vec<&NetworkLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| e.matches_type(&self.resource_type))
            .filter(|e| !self.only_errors || e.is_error())
            .take(self.limit)
            .collect();
        matched.reverse();
        matched
    }
}

pub struct CheckNetworkTrafficTool {
    network: NetworkWatchdog,
}

impl CheckNetworkTrafficTool {
    pub fn new(network: NetworkWatchdog) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for CheckNetworkTrafficTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "check_network_traffic",
            description: "List recent network requests captured on the focused browser tab, one summary line per request: [METHOD] status URL (type) duration.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "resource_type": {
                        "type": "string",
                        "description": "Filter requests by type: 'XHR', 'Fetch', 'Document', 'Script', or 'All'. Default: XHR"
                    },
                    "only_errors": {
                        "type": "boolean",
                        "description": "Only include failed requests or responses with status >= 400. Default: false"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 200,
                        "description": "Maximum number of matching requests to include. Default: 20"
                    }
                }
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        parse_request::<CheckNetworkTrafficRequest>(params)?.validate()
    }

    async fn execute(&self, _ctx: ToolContext, params: Value) -> Result<Value> {
        let request: CheckNetworkTrafficRequest = parse_request(&params)?;
        request.validate()?;

        let Some(target_id) = self.network.on_state_request().await else {
            return Ok(json!({"requests": [], "message": NO_FOCUSED_TARGET}));
        };
        let entries = self.network.get_traffic_log(&target_id);
        let selected = request.select(&entries);
        debug!(resource_type = %request.resource_type, matched = selected.len(), "check_network_traffic");

        Ok(json!({
            "target_id": target_id,
            "resource_type": request.resource_type,
            "only_errors": request.only_errors,
            "count": selected.len(),
            "requests": selected.iter().map(|e| e.summary()).collect::<Vec<_>>(),
        }))
    }
}

// ─── get_response_body ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GetResponseBodyRequest {
    pub url_pattern: String,
}

pub struct GetResponseBodyTool {
    network: NetworkWatchdog,
}

impl GetResponseBodyTool {
    pub fn new(network: NetworkWatchdog) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GetResponseBodyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_response_body",
            description: "Fetch the response body of the most recent captured request whose URL contains url_pattern.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "url_pattern": {
                        "type": "string",
                        "description": "Unique substring to identify the request URL (e.g. '/api/v1/search')"
                    }
                },
                "required": ["url_pattern"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        parse_request::<GetResponseBodyRequest>(params).map(|_| ())
    }

    async fn execute(&self, _ctx: ToolContext, params: Value) -> Result<Value> {
        let request: GetResponseBodyRequest = parse_request(&params)?;

        let (target_id, entry) = match lookup(&self.network, &request.url_pattern).await {
            Ok(found) => found,
            Err(placeholder) => return Ok(placeholder),
        };
        let body = self
            .network
            .get_response_body(&target_id, &entry.request_id)
            .await
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| BODY_NOT_AVAILABLE.to_string());

        Ok(json!({
            "found": true,
            "target_id": target_id,
            "request_id": entry.request_id,
            "url": entry.url,
            "body": body,
        }))
    }
}

// ─── get_network_request_details ───────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GetNetworkRequestDetailsRequest {
    pub url_pattern: String,
    #[serde(default = "default_true")]
    pub include_headers: bool,
    #[serde(default = "default_true")]
    pub include_request_body: bool,
    #[serde(default)]
    pub include_response_body: bool,
    #[serde(default = "default_max_response_body_length")]
    pub max_response_body_length: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_response_body_length() -> usize {
    4000
}

impl GetNetworkRequestDetailsRequest {
    pub fn validate(&self) -> Result<()> {
        check_range("max_response_body_length", self.max_response_body_length, 500, 20000)
    }

    pub fn options(&self) -> DetailOptions {
        DetailOptions {
            include_headers: self.include_headers,
            include_request_body: self.include_request_body,
            include_response_body: self.include_response_body,
            body_length: self.max_response_body_length,
        }
    }
}

pub struct GetNetworkRequestDetailsTool {
    network: NetworkWatchdog,
}

impl GetNetworkRequestDetailsTool {
    pub fn new(network: NetworkWatchdog) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GetNetworkRequestDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_network_request_details",
            description: "Show status, timing, size, initiator, headers and optionally the body of the most recent captured request whose URL contains url_pattern.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "url_pattern": {
                        "type": "string",
                        "description": "Unique substring to identify the request URL to inspect"
                    },
                    "include_headers": {
                        "type": "boolean",
                        "description": "Include request and response headers in the output. Default: true"
                    },
                    "include_request_body": {
                        "type": "boolean",
                        "description": "Include captured request body preview if available. Default: true"
                    },
                    "include_response_body": {
                        "type": "boolean",
                        "description": "Fetch and include the response body (truncated). Default: false"
                    },
                    "max_response_body_length": {
                        "type": "integer",
                        "minimum": 500,
                        "maximum": 20000,
                        "description": "Max characters of response body. Default: 4000"
                    }
                },
                "required": ["url_pattern"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        parse_request::<GetNetworkRequestDetailsRequest>(params)?.validate()
    }

    async fn execute(&self, _ctx: ToolContext, params: Value) -> Result<Value> {
        let request: GetNetworkRequestDetailsRequest = parse_request(&params)?;
        request.validate()?;

        let (target_id, entry) = match lookup(&self.network, &request.url_pattern).await {
            Ok(found) => found,
            Err(placeholder) => return Ok(placeholder),
        };
        let details = self
            .network
            .format_entry_details(&target_id, &entry, &request.options())
            .await;

        Ok(json!({
            "found": true,
            "target_id": target_id,
            "request_id": entry.request_id,
            "details": details,
        }))
    }
}

// ─── get_network_request_stack ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GetNetworkRequestStackRequest {
    pub url_pattern: String,
    #[serde(default = "default_frame_limit")]
    pub frame_limit: usize,
}

fn default_frame_limit() -> usize {
    10
}

impl GetNetworkRequestStackRequest {
    pub fn validate(&self) -> Result<()> {
        check_range("frame_limit", self.frame_limit, 1, 30)
    }
}

pub struct GetNetworkRequestStackTool {
    network: NetworkWatchdog,
}

impl GetNetworkRequestStackTool {
    pub fn new(network: NetworkWatchdog) -> Self {
        Self { network }
    }
}

#[async_trait]
impl Tool for GetNetworkRequestStackTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_network_request_stack",
            description: "Show the JavaScript call stack that initiated the most recent captured request whose URL contains url_pattern, including async parents.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "url_pattern": {
                        "type": "string",
                        "description": "Unique substring to identify the request URL whose stack trace to fetch"
                    },
                    "frame_limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 30,
                        "description": "Maximum stack frames to include. Default: 10"
                    }
                },
                "required": ["url_pattern"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        parse_request::<GetNetworkRequestStackRequest>(params)?.validate()
    }

    async fn execute(&self, _ctx: ToolContext, params: Value) -> Result<Value> {
        let request: GetNetworkRequestStackRequest = parse_request(&params)?;
        request.validate()?;

        let (target_id, entry) = match lookup(&self.network, &request.url_pattern).await {
            Ok(found) => found,
            Err(placeholder) => return Ok(placeholder),
        };
        let stack = if entry.has_stack() {
            format_stack_trace(&entry, request.frame_limit)
        } else {
            NO_STACK.to_string()
        };

        Ok(json!({
            "found": true,
            "target_id": target_id,
            "url": entry.url,
            "initiator_type": entry.initiator_type,
            "frames": entry.stack_trace.len(),
            "stack": stack,
        }))
    }
}

// ─── take_screenshot ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TakeScreenshotRequest {
    pub timeout_secs: Option<f64>,
    pub output_path: Option<String>,
}

impl TakeScreenshotRequest {
    pub fn validate(&self) -> Result<()> {
        self.timeout().map(|_| ())
    }

    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.timeout_secs
            .map(|secs| timeout_from_secs("timeout_secs", secs))
            .transpose()
    }
}

pub struct TakeScreenshotTool {
    screenshot: ScreenshotWatchdog,
}

impl TakeScreenshotTool {
    pub fn new(screenshot: ScreenshotWatchdog) -> Self {
        Self { screenshot }
    }
}

#[async_trait]
impl Tool for TakeScreenshotTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "take_screenshot",
            description: "Capture a PNG screenshot of the focused page (or the most recent page tab). Returns base64 data, or writes the image to output_path.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "timeout_secs": {
                        "type": "number",
                        "description": "Overall timeout in seconds. Default: 15"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Write the decoded image to this file instead of returning base64"
                    }
                }
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        parse_request::<TakeScreenshotRequest>(params)?.validate()
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let request: TakeScreenshotRequest = parse_request(&params)?;
        let timeout = request.timeout()?;

        let data = self
            .screenshot
            .capture(timeout, ctx.cancel.as_ref())
            .await?;

        let Some(output_path) = request.output_path else {
            return Ok(json!({"format": "png", "data": data}));
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| Error::Capture(format!("Screenshot data is not valid base64: {}", e)))?;
        let path = PathBuf::from(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        Ok(json!({
            "format": "png",
            "path": path.display().to_string(),
            "bytes": bytes.len(),
        }))
    }
}
