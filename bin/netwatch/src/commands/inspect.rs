use netwatch_tools::browser::short_id;
use netwatch_tools::network::{format_stack_trace, DetailOptions};
use std::time::Duration;

use super::{Browser, GlobalOpts};

/// Observe the focused tab for `wait_secs`, then print the newest request
/// whose URL contains `pattern`.
pub async fn run(
    opts: &GlobalOpts,
    pattern: &str,
    wait_secs: u64,
    body: bool,
    stack: Option<usize>,
) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let browser = Browser::connect(&config).await?;

    let Some(target_id) = browser.network.on_state_request().await else {
        anyhow::bail!("No page target to observe");
    };
    if !browser.network.is_monitored(&target_id) {
        anyhow::bail!("Could not attach to target {}", short_id(&target_id));
    }

    println!("👀 Observing [{}] for {}s...", short_id(&target_id), wait_secs);
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = tokio::time::sleep(Duration::from_secs(wait_secs)) => {}
    }

    let Some(entry) = browser.network.find_entry(&target_id, pattern) else {
        println!("No captured request matches '{}'.", pattern);
        return Ok(());
    };

    let options = DetailOptions {
        include_response_body: body,
        ..DetailOptions::default()
    };
    println!();
    println!(
        "{}",
        browser
            .network
            .format_entry_details(&target_id, &entry, &options)
            .await
    );

    if let Some(frame_limit) = stack {
        println!();
        if entry.has_stack() {
            println!("Initiator stack:");
            println!("{}", format_stack_trace(&entry, frame_limit));
        } else {
            println!("No stack trace captured for this request.");
        }
    }
    Ok(())
}
