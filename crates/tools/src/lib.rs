pub mod browser;
pub mod network;
pub mod network_tools;
pub mod registry;
pub mod screenshot;

use async_trait::async_trait;
use netwatch_core::Result;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use network::NetworkWatchdog;
pub use registry::ToolRegistry;
pub use screenshot::{CaptureError, ScreenshotWatchdog};

/// Split `s` after at most `max_chars` characters, respecting UTF-8 char
/// boundaries. Returns the kept prefix and how many characters were dropped.
pub fn truncate_chars(s: &str, max_chars: usize) -> (&str, usize) {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => (&s[..end], s[end..].chars().count()),
        None => (s, 0),
    }
}

#[derive(Clone, Default)]
pub struct ToolContext {
    /// Fired when the caller abandons the tool call.
    pub cancel: Option<CancellationToken>,
}

pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;
    fn validate(&self, params: &Value) -> Result<()>;
    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value>;
}
