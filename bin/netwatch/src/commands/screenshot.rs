use anyhow::Context;
use base64::Engine;
use netwatch_core::{timeout_from_secs, Paths};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

use super::{Browser, GlobalOpts};

pub async fn run(
    opts: &GlobalOpts,
    output: Option<PathBuf>,
    timeout_secs: Option<f64>,
) -> anyhow::Result<()> {
    let timeout = timeout_secs
        .map(|secs| timeout_from_secs("--timeout-secs", secs))
        .transpose()?;
    let config = opts.load_config()?;
    let browser = Browser::connect(&config).await?;

    // Ctrl-C cancels the capture; the gate still cleans up.
    let cancel = CancellationToken::new();
    let on_ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = browser.screenshot.capture(timeout, Some(&cancel)).await;
    on_ctrl_c.abort();
    let data = result?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .context("Screenshot data is not valid base64")?;

    let path = match output {
        Some(path) => path,
        None => {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            Paths::new().screenshot_file(stamp)
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("📸 Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
