//! Screenshot capture behind a single-slot gate.
//!
//! Only one capture may run against the browser at a time. A second request
//! waits briefly for the gate and then fails with [`CaptureError::InProgress`]
//! instead of queueing. Unlike network observation, every capture failure is
//! surfaced to the caller.

use netwatch_core::{Error, ScreenshotConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::browser::{short_id, BrowserHost, TargetInfo};

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("Another screenshot is already in progress")]
    InProgress,

    #[error("No page targets available for screenshot")]
    NoPageTarget,

    #[error("Screenshot result missing data")]
    MissingData,

    #[error("Screenshot capture timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Screenshot capture was cancelled")]
    Cancelled,

    #[error(transparent)]
    Session(#[from] Error),
}

impl From<CaptureError> for Error {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Timeout { .. } => Error::Timeout(err.to_string()),
            CaptureError::Session(inner) => Error::Capture(inner.to_string()),
            other => Error::Capture(other.to_string()),
        }
    }
}

/// Clears highlight overlays when dropped without having run, e.g. when the
/// capture future itself is cancelled by its owner.
struct HighlightCleanup {
    host: Option<Arc<dyn BrowserHost>>,
}

impl HighlightCleanup {
    fn new(host: Arc<dyn BrowserHost>) -> Self {
        Self { host: Some(host) }
    }

    async fn run(mut self) {
        if let Some(host) = self.host.take() {
            remove_highlights(host).await;
        }
    }
}

impl Drop for HighlightCleanup {
    fn drop(&mut self) {
        let Some(host) = self.host.take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(remove_highlights(host));
        }
    }
}

async fn remove_highlights(host: Arc<dyn BrowserHost>) {
    if let Err(e) = host.remove_highlights().await {
        debug!("Failed to remove highlights after screenshot: {}", e);
    }
}

#[derive(Clone)]
pub struct ScreenshotWatchdog {
    host: Arc<dyn BrowserHost>,
    config: Arc<ScreenshotConfig>,
    gate: Arc<Mutex<()>>,
}

impl ScreenshotWatchdog {
    pub fn new(host: Arc<dyn BrowserHost>, config: ScreenshotConfig) -> Self {
        Self {
            host,
            config: Arc::new(config),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Capture the focused page (or the most recent page target) and return
    /// the base64 image payload.
    ///
    /// `timeout` is the caller's overall budget; the capture command gets
    /// whatever remains after the gate wait margin.
    pub async fn capture(
        &self,
        timeout: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, CaptureError> {
        let cleanup = HighlightCleanup::new(self.host.clone());

        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(CaptureError::Cancelled),
                result = self.capture_gated(timeout) => result,
            },
            None => self.capture_gated(timeout).await,
        };

        // The gate is already released here; overlay cleanup is best-effort.
        cleanup.run().await;

        match &outcome {
            Ok(_) => debug!("Screenshot captured successfully"),
            Err(e @ (CaptureError::Timeout { .. } | CaptureError::Cancelled)) => warn!("{}", e),
            Err(e) => error!("Screenshot failed: {}", e),
        }
        outcome
    }

    async fn capture_gated(&self, timeout: Option<Duration>) -> Result<String, CaptureError> {
        let _held = tokio::time::timeout(self.config.lock_wait(), self.gate.lock())
            .await
            .map_err(|_| CaptureError::InProgress)?;

        let target = self.select_target().await?;
        let session = self.host.get_or_create_session(&target.target_id, true).await?;

        let budget = self.config.capture_timeout(timeout);
        let params = json!({
            "format": self.config.format,
            "captureBeyondViewport": false,
        });
        debug!(target_id = %short_id(&target.target_id), ?budget, "Taking screenshot");

        let result = tokio::time::timeout(budget, session.send("Page.captureScreenshot", params))
            .await
            .map_err(|_| CaptureError::Timeout { after: budget })??;

        result
            .get("data")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(CaptureError::MissingData)
    }

    /// The focused target when it is a top-level page, otherwise the most
    /// recently discovered page target.
    async fn select_target(&self) -> Result<TargetInfo, CaptureError> {
        let focused = self.host.focused_target().await;
        if let Some(target) = focused.as_ref().filter(|t| t.is_page()) {
            return Ok(target.clone());
        }

        let focused_type = focused.as_ref().map_or("None", |t| t.target_type.as_str());
        warn!(focused_type, "Focused target is not a page, falling back to page target");

        self.host
            .page_targets()
            .await
            .pop()
            .ok_or(CaptureError::NoPageTarget)
    }
}
