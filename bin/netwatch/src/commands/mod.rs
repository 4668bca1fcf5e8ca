pub mod config_cmd;
pub mod inspect;
pub mod screenshot;
pub mod tools_cmd;
pub mod watch;

use anyhow::Context;
use netwatch_core::{Config, Paths};
use netwatch_tools::browser::{BrowserHost, DevToolsHost};
use netwatch_tools::{NetworkWatchdog, ScreenshotWatchdog, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;

/// Flags shared by every subcommand.
pub struct GlobalOpts {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| Paths::new().config_file())
    }

    /// Config file (or defaults) with command-line overrides applied.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load_or_default(&Paths::new())?,
        };
        if let Some(host) = &self.host {
            config.cdp.host = host.clone();
        }
        if let Some(port) = self.port {
            config.cdp.port = port;
        }
        Ok(config)
    }
}

/// A reachable browser and the engines observing it.
pub struct Browser {
    pub host: Arc<DevToolsHost>,
    pub network: NetworkWatchdog,
    pub screenshot: ScreenshotWatchdog,
}

impl Browser {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let host = Arc::new(DevToolsHost::new(config.cdp.clone()));
        host.list_targets().await.with_context(|| {
            format!(
                "Cannot reach Chrome at {} (start it with --remote-debugging-port={})",
                config.cdp.http_base(),
                config.cdp.port
            )
        })?;
        host.ensure_focus().await;

        let shared: Arc<dyn BrowserHost> = host.clone();
        Ok(Self {
            network: NetworkWatchdog::new(shared.clone(), config.network.clone()),
            screenshot: ScreenshotWatchdog::new(shared, config.screenshot.clone()),
            host,
        })
    }

    pub fn registry(&self) -> ToolRegistry {
        ToolRegistry::with_network(self.network.clone(), self.screenshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_unbounded_timeout_is_rejected() {
        let path = std::env::temp_dir().join(format!("netwatch-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "screenshot": { "lockWaitSecs": 1e20 } }"#).unwrap();
        let opts = GlobalOpts {
            host: None,
            port: None,
            config: Some(path.clone()),
        };
        let err = opts.load_config().unwrap_err();
        assert!(format!("{:#}", err).contains("screenshot.lockWaitSecs"));
        let _ = std::fs::remove_file(&path);
    }
}
