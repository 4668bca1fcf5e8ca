use netwatch_tools::browser::{short_id, BrowserHost};
use netwatch_tools::network_tools::CheckNetworkTrafficRequest;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::info;

use super::{Browser, GlobalOpts};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Attach to every target as it appears and print what was captured on exit.
pub async fn run(
    opts: &GlobalOpts,
    duration_secs: Option<u64>,
    resource_type: &str,
    errors: bool,
) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let browser = Browser::connect(&config).await?;
    let deadline = duration_secs.map(|secs| Instant::now() + Duration::from_secs(secs));

    println!();
    println!("👀 Watching {} (Ctrl-C to stop)", config.cdp.http_base());
    println!();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut known: HashSet<String> = HashSet::new();
    loop {
        for target in browser.host.targets().await {
            if known.insert(target.target_id.clone()) {
                info!(target_id = %short_id(&target.target_id), kind = %target.target_type, url = %target.url, "New target");
                browser.network.on_target_created(&target.target_id).await;
            }
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }

    let filter = CheckNetworkTrafficRequest {
        resource_type: resource_type.to_string(),
        only_errors: errors,
        limit: config.network.max_entries_per_target,
    };
    print_summary(&browser, &filter).await;
    Ok(())
}

async fn print_summary(browser: &Browser, filter: &CheckNetworkTrafficRequest) {
    let titles: Vec<(String, String)> = browser
        .host
        .targets()
        .await
        .into_iter()
        .map(|t| (t.target_id, t.title))
        .collect();

    let monitored = browser.network.monitored_targets();
    if monitored.is_empty() {
        println!("No targets were monitored.");
        return;
    }

    for target_id in monitored {
        let entries = browser.network.get_traffic_log(&target_id);
        let selected = filter.select(&entries);
        let title = titles
            .iter()
            .find(|(id, _)| id == &target_id)
            .map(|(_, title)| title.as_str())
            .unwrap_or("(closed)");

        println!("📄 {} [{}] {} of {} requests", title, short_id(&target_id), selected.len(), entries.len());
        for entry in selected {
            println!("   {}", entry.summary());
        }
        println!();
    }
}
