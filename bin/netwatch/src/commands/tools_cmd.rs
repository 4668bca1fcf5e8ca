use netwatch_core::Config;
use netwatch_tools::browser::{BrowserHost, DevToolsHost};
use netwatch_tools::{NetworkWatchdog, ScreenshotWatchdog, ToolContext, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;

use super::{Browser, GlobalOpts};

fn schema_function(schema: &Value) -> &Value {
    schema.get("function").unwrap_or(schema)
}

/// Registry for describing tools; nothing connects until a tool runs.
fn describe_registry(config: &Config) -> ToolRegistry {
    let host: Arc<dyn BrowserHost> = Arc::new(DevToolsHost::new(config.cdp.clone()));
    ToolRegistry::with_network(
        NetworkWatchdog::new(host.clone(), config.network.clone()),
        ScreenshotWatchdog::new(host, config.screenshot.clone()),
    )
}

/// List all registered tools.
pub async fn list(opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let schemas = describe_registry(&config).get_tool_schemas();

    println!();
    println!("🔧 Registered tools ({} total)", schemas.len());
    println!();
    for schema in &schemas {
        let func = schema_function(schema);
        let name = func["name"].as_str().unwrap_or("");
        let desc = func["description"].as_str().unwrap_or("");
        let short_desc: String = desc.chars().take(70).collect();
        let ellipsis = if desc.chars().count() > 70 { "..." } else { "" };
        println!("  {:<30} {}{}", name, short_desc, ellipsis);
    }
    println!();
    Ok(())
}

/// Show detailed info for a specific tool.
pub async fn info(opts: &GlobalOpts, tool_name: &str) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let schemas = describe_registry(&config).get_tool_schemas();

    let Some(schema) = schemas
        .iter()
        .find(|s| schema_function(s)["name"].as_str() == Some(tool_name))
    else {
        anyhow::bail!("Tool '{}' not found. Use `netwatch tools list` to see all tools.", tool_name);
    };

    let func = schema_function(schema);
    println!();
    println!("🔧 {}", tool_name);
    println!("  {}", func["description"].as_str().unwrap_or(""));
    println!();

    let params = &func["parameters"];
    let required: Vec<&str> = params["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    if let Some(props) = params["properties"].as_object() {
        println!("  Parameters:");
        for (key, val) in props {
            let typ = val.get("type").and_then(|t| t.as_str()).unwrap_or("any");
            let req = if required.contains(&key.as_str()) { " (required)" } else { "" };
            println!("    {:<26} {:<8}{}", key, typ, req);
            if let Some(desc) = val.get("description").and_then(|d| d.as_str()) {
                println!("      {}", desc);
            }
        }
    }
    println!();
    Ok(())
}

/// Run a tool against the connected browser with JSON params.
pub async fn run(opts: &GlobalOpts, tool_name: &str, params_json: &str) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let params: Value = serde_json::from_str(params_json)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON params: {}", e))?;

    let browser = Browser::connect(&config).await?;
    let ctx = ToolContext::default();
    let result = browser.registry().execute(tool_name, ctx, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
