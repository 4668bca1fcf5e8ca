//! Browser host and per-target CDP sessions.
//!
//! The observation engine only talks to the [`BrowserHost`] and [`CdpSession`]
//! traits. [`DevToolsHost`] is the concrete host backed by a running Chrome
//! exposing `--remote-debugging-port`: targets are discovered through
//! `/json/list` and each target gets its own WebSocket [`CdpClient`].

use async_trait::async_trait;
use netwatch_core::{CdpConfig, Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use super::cdp::CdpClient;

/// A command/event channel bound to one target.
#[async_trait]
pub trait CdpSession: Send + Sync {
    /// Send a command and wait for its `result` object.
    async fn send(&self, method: &str, params: Value) -> Result<Value>;
    /// Register for one event kind. Events arrive on the receiver in protocol order.
    async fn subscribe(&self, event: &str) -> mpsc::Receiver<Value>;
}

/// One debuggable target as reported by Chrome.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    #[serde(rename = "id")]
    pub target_id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    /// Top-level page or tab. Only these can be captured as screenshots.
    pub fn is_page(&self) -> bool {
        matches!(self.target_type.as_str(), "page" | "tab")
    }
}

/// Last four characters of a target id, used in log lines.
pub fn short_id(target_id: &str) -> &str {
    let mut start = target_id.len().saturating_sub(4);
    while start > 0 && !target_id.is_char_boundary(start) {
        start -= 1;
    }
    &target_id[start..]
}

/// Everything the observation engine and capture gate need from the browser.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    async fn get_or_create_session(&self, target_id: &str, focus: bool) -> Result<Arc<dyn CdpSession>>;
    /// The target the caller currently works in, if any.
    async fn focused_target(&self) -> Option<TargetInfo>;
    /// All known targets, oldest discovery first.
    async fn targets(&self) -> Vec<TargetInfo>;
    /// Page/tab targets, oldest discovery first.
    async fn page_targets(&self) -> Vec<TargetInfo> {
        self.targets().await.into_iter().filter(|t| t.is_page()).collect()
    }
    /// Clear visual overlays left by element highlighting.
    async fn remove_highlights(&self) -> Result<()>;
}

const REMOVE_HIGHLIGHTS_JS: &str = r#"(() => {
  const nodes = document.querySelectorAll('[data-netwatch-highlight]');
  nodes.forEach(n => n.remove());
  return nodes.length;
})()"#;

/// [`BrowserHost`] backed by Chrome's HTTP discovery endpoint.
pub struct DevToolsHost {
    config: CdpConfig,
    http: reqwest::Client,
    sessions: Mutex<HashMap<String, Arc<CdpClient>>>,
    focused: Mutex<Option<String>>,
    /// Target ids in the order they were first seen.
    seen: Mutex<Vec<String>>,
}

impl DevToolsHost {
    pub fn new(config: CdpConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            sessions: Mutex::new(HashMap::new()),
            focused: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Fetch `/json/list` and order the result by first discovery.
    pub async fn list_targets(&self) -> Result<Vec<TargetInfo>> {
        let url = format!("{}/json/list", self.config.http_base());
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Session(format!("Failed to query {}: {}", url, e)))?;
        let mut targets: Vec<TargetInfo> = resp
            .json()
            .await
            .map_err(|e| Error::Session(format!("Invalid target list from {}: {}", url, e)))?;

        let mut seen = self.seen.lock().await;
        for target in &targets {
            if !seen.contains(&target.target_id) {
                seen.push(target.target_id.clone());
            }
        }
        targets.sort_by_key(|t| seen.iter().position(|id| id == &t.target_id));
        Ok(targets)
    }

    pub async fn set_focus(&self, target_id: &str) {
        *self.focused.lock().await = Some(target_id.to_string());
    }

    /// Focus the most recently discovered page when nothing is focused yet.
    pub async fn ensure_focus(&self) -> Option<String> {
        if let Some(id) = self.focused.lock().await.clone() {
            return Some(id);
        }
        let page = self.page_targets().await.pop()?;
        self.set_focus(&page.target_id).await;
        Some(page.target_id)
    }

    async fn connect_target(&self, target_id: &str) -> Result<Arc<CdpClient>> {
        let targets = self.list_targets().await?;
        let ws_url = targets
            .iter()
            .find(|t| t.target_id == target_id)
            .and_then(|t| t.web_socket_debugger_url.clone())
            .ok_or_else(|| {
                Error::Session(format!("No WebSocket URL found for target '{}'", target_id))
            })?;

        let client = CdpClient::connect(
            &ws_url,
            self.config.command_timeout(),
            self.config.event_buffer,
        )
        .await?;
        info!(target_id = %short_id(target_id), ws_url = %ws_url, "CDP session established");
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl BrowserHost for DevToolsHost {
    async fn get_or_create_session(&self, target_id: &str, focus: bool) -> Result<Arc<dyn CdpSession>> {
        let client = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get(target_id) {
                Some(client) => client.clone(),
                None => {
                    let client = self.connect_target(target_id).await?;
                    sessions.insert(target_id.to_string(), client.clone());
                    client
                }
            }
        };

        if focus {
            self.set_focus(target_id).await;
            if let Err(e) = client.send_command("Page.bringToFront", json!({})).await {
                debug!(target_id = %short_id(target_id), "Page.bringToFront failed: {}", e);
            }
        }
        Ok(client as Arc<dyn CdpSession>)
    }

    async fn focused_target(&self) -> Option<TargetInfo> {
        let focused = self.focused.lock().await.clone()?;
        self.targets()
            .await
            .into_iter()
            .find(|t| t.target_id == focused)
    }

    async fn targets(&self) -> Vec<TargetInfo> {
        match self.list_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                debug!("Target discovery failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn remove_highlights(&self) -> Result<()> {
        let Some(focused) = self.focused.lock().await.clone() else {
            return Ok(());
        };
        let client = self.sessions.lock().await.get(&focused).cloned();
        if let Some(client) = client {
            client
                .send_command(
                    "Runtime.evaluate",
                    json!({"expression": REMOVE_HIGHLIGHTS_JS, "returnByValue": true}),
                )
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_info_from_json_list() {
        let raw = json!([
            {
                "description": "",
                "id": "8F1D0A6C21B7",
                "title": "Example",
                "type": "page",
                "url": "https://example.com/",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/8F1D0A6C21B7"
            },
            { "id": "W1", "type": "service_worker", "url": "https://example.com/sw.js" }
        ]);
        let targets: Vec<TargetInfo> = serde_json::from_value(raw).unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets[0].is_page());
        assert!(!targets[1].is_page());
        assert!(targets[1].web_socket_debugger_url.is_none());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("8F1D0A6C21B7"), "21B7");
        assert_eq!(short_id("ab"), "ab");
    }
}
