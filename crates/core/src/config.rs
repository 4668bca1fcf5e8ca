use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Ring buffer capacity per monitored target. Oldest entries are evicted first.
    #[serde(default = "default_max_entries_per_target")]
    pub max_entries_per_target: usize,
    /// CDP resource types that never produce log entries.
    #[serde(default = "default_ignored_resource_types")]
    pub ignored_resource_types: HashSet<String>,
    #[serde(default = "default_request_body_preview_chars")]
    pub request_body_preview_chars: usize,
}

fn default_max_entries_per_target() -> usize {
    200
}

fn default_ignored_resource_types() -> HashSet<String> {
    ["Image", "Stylesheet", "Font", "Media", "Manifest", "Other"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_request_body_preview_chars() -> usize {
    2000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_entries_per_target: default_max_entries_per_target(),
            ignored_resource_types: default_ignored_resource_types(),
            request_body_preview_chars: default_request_body_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotConfig {
    /// How long a capture request waits for the gate before failing as "in progress".
    #[serde(default = "default_lock_wait_secs")]
    pub lock_wait_secs: f64,
    /// Overall budget used when the caller does not pass a timeout.
    #[serde(default = "default_screenshot_timeout")]
    pub default_timeout_secs: f64,
    #[serde(default = "default_timeout_margin_secs")]
    pub timeout_margin_secs: f64,
    #[serde(default = "default_min_capture_secs")]
    pub min_capture_secs: f64,
    #[serde(default = "default_screenshot_format")]
    pub format: String,
}

fn default_lock_wait_secs() -> f64 {
    2.0
}

fn default_screenshot_timeout() -> f64 {
    15.0
}

fn default_timeout_margin_secs() -> f64 {
    2.0
}

fn default_min_capture_secs() -> f64 {
    1.0
}

fn default_screenshot_format() -> String {
    "png".to_string()
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            lock_wait_secs: default_lock_wait_secs(),
            default_timeout_secs: default_screenshot_timeout(),
            timeout_margin_secs: default_timeout_margin_secs(),
            min_capture_secs: default_min_capture_secs(),
            format: default_screenshot_format(),
        }
    }
}

/// Upper bound for every timeout expressed in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Convert a caller-supplied timeout, rejecting values that are not finite,
/// not positive, or above [`MAX_TIMEOUT_SECS`].
pub fn timeout_from_secs(name: &str, secs: f64) -> Result<Duration> {
    if !(secs.is_finite() && secs > 0.0 && secs <= MAX_TIMEOUT_SECS) {
        return Err(Error::Validation(format!(
            "{} must be a positive number of seconds up to {}, got {}",
            name, MAX_TIMEOUT_SECS, secs
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| Error::Validation(format!("{}: {}", name, e)))
}

/// Seconds to a `Duration`, clamped into `[0, MAX_TIMEOUT_SECS]`. NaN maps to zero.
fn clamped(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_TIMEOUT_SECS)).unwrap_or_default()
}

fn check_secs(name: &str, secs: f64, allow_zero: bool) -> Result<()> {
    let in_range = secs.is_finite()
        && secs <= MAX_TIMEOUT_SECS
        && if allow_zero { secs >= 0.0 } else { secs > 0.0 };
    if in_range {
        return Ok(());
    }
    let lower = if allow_zero { "0" } else { "above 0" };
    Err(Error::Config(format!(
        "{} must be between {} and {} seconds, got {}",
        name, lower, MAX_TIMEOUT_SECS, secs
    )))
}

impl ScreenshotConfig {
    pub fn lock_wait(&self) -> Duration {
        clamped(self.lock_wait_secs)
    }

    /// Budget for the capture command itself: `max(overall - margin, min)`.
    pub fn capture_timeout(&self, overall: Option<Duration>) -> Duration {
        let overall = overall
            .map(|d| d.as_secs_f64())
            .unwrap_or(self.default_timeout_secs);
        clamped((overall - self.timeout_margin_secs).max(self.min_capture_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpConfig {
    #[serde(default = "default_cdp_host")]
    pub host: String,
    #[serde(default = "default_cdp_port")]
    pub port: u16,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Channel depth for each event subscription.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_cdp_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cdp_port() -> u16 {
    9222
}

fn default_command_timeout() -> u64 {
    30
}

fn default_event_buffer() -> usize {
    256
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            host: default_cdp_host(),
            port: default_cdp_port(),
            command_timeout_secs: default_command_timeout(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl CdpConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
    #[serde(default)]
    pub cdp: CdpConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.max_entries_per_target == 0 {
            return Err(Error::Config(
                "network.maxEntriesPerTarget must be at least 1".to_string(),
            ));
        }
        let shot = &self.screenshot;
        check_secs("screenshot.lockWaitSecs", shot.lock_wait_secs, true)?;
        check_secs("screenshot.defaultTimeoutSecs", shot.default_timeout_secs, false)?;
        check_secs("screenshot.timeoutMarginSecs", shot.timeout_margin_secs, true)?;
        check_secs("screenshot.minCaptureSecs", shot.min_capture_secs, false)?;
        Ok(())
    }
}
