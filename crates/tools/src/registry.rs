use netwatch_core::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::network::NetworkWatchdog;
use crate::network_tools::{
    CheckNetworkTrafficTool, GetNetworkRequestDetailsTool, GetNetworkRequestStackTool,
    GetResponseBodyTool, TakeScreenshotTool,
};
use crate::screenshot::ScreenshotWatchdog;
use crate::{Tool, ToolContext};

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four traffic queries and the screenshot tool.
    pub fn with_network(network: NetworkWatchdog, screenshot: ScreenshotWatchdog) -> Self {
        let mut registry = Self::new();

        // Traffic queries
        registry.register(Arc::new(CheckNetworkTrafficTool::new(network.clone())));
        registry.register(Arc::new(GetResponseBodyTool::new(network.clone())));
        registry.register(Arc::new(GetNetworkRequestDetailsTool::new(network.clone())));
        registry.register(Arc::new(GetNetworkRequestStackTool::new(network)));

        // Capture
        registry.register(Arc::new(TakeScreenshotTool::new(screenshot)));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        debug!(name = schema.name, "Registering tool");
        self.tools.insert(schema.name.to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn get_tool_schemas(&self) -> Vec<Value> {
        let mut names = self.tool_names();
        names.sort();
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                let schema = tool.schema();
                json!({
                    "type": "function",
                    "function": {
                        "name": schema.name,
                        "description": schema.description,
                        "parameters": schema.parameters
                    }
                })
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub async fn execute(&self, name: &str, ctx: ToolContext, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Unknown tool: {}", name)))?;

        if let Err(e) = tool.validate(&params) {
            warn!(tool = name, error = %e, "Tool validation failed");
            return Err(e);
        }

        debug!(tool = name, "Executing tool");
        tool.execute(ctx, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::FakeHost;
    use netwatch_core::{NetworkConfig, ScreenshotConfig};

    fn registry() -> ToolRegistry {
        let host = FakeHost::new();
        ToolRegistry::with_network(
            NetworkWatchdog::new(host.clone(), NetworkConfig::default()),
            ScreenshotWatchdog::new(host, ScreenshotConfig::default()),
        )
    }

    #[test]
    fn test_registry_new_empty() {
        let reg = ToolRegistry::new();
        assert!(reg.tool_names().is_empty());
        assert!(reg.get("check_network_traffic").is_none());
    }

    #[test]
    fn test_registry_with_network_tools() {
        let reg = registry();
        let mut names = reg.tool_names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "check_network_traffic",
                "get_network_request_details",
                "get_network_request_stack",
                "get_response_body",
                "take_screenshot",
            ]
        );
    }

    #[test]
    fn test_schemas_are_function_objects() {
        let schemas = registry().get_tool_schemas();
        assert_eq!(schemas.len(), 5);
        assert_eq!(schemas[0]["function"]["name"], "check_network_traffic");
        assert!(schemas
            .iter()
            .all(|s| s["type"] == "function" && s["function"]["parameters"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_execute_unknown_and_invalid() {
        let reg = registry();
        let err = reg
            .execute("nope", ToolContext::default(), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = reg
            .execute("get_response_body", ToolContext::default(), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
