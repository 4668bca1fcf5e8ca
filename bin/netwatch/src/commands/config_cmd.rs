use netwatch_core::Config;

use super::GlobalOpts;

/// Show the effective configuration as pretty-printed JSON.
pub async fn show(opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = opts.load_config()?;
    let path = opts.config_path();

    println!();
    println!("📋 Current Configuration");
    if path.exists() {
        println!("  File: {}", path.display());
    } else {
        println!("  File: {} (not found, using defaults)", path.display());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Write the default configuration file.
pub async fn init(opts: &GlobalOpts, force: bool) -> anyhow::Result<()> {
    let path = opts.config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(&path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}
