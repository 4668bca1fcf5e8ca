mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::GlobalOpts;

#[derive(Parser)]
#[command(name = "netwatch")]
#[command(about = "Watch browser network traffic over the Chrome DevTools Protocol", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chrome remote debugging host (overrides config cdp.host)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Chrome remote debugging port (overrides config cdp.port)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Config file (default: ~/.netwatch/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach to every tab and print captured traffic on exit
    Watch {
        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Resource type to list: XHR, Fetch, Document, Script or All
        #[arg(short = 't', long = "type", default_value = "All")]
        resource_type: String,

        /// Only list failed requests and HTTP errors
        #[arg(short, long)]
        errors: bool,
    },

    /// Observe the focused tab, then show the newest request matching a URL substring
    Inspect {
        /// URL substring to match (case-insensitive)
        pattern: String,

        /// Seconds to observe before looking up the request
        #[arg(short, long, default_value_t = 5)]
        wait_secs: u64,

        /// Also fetch the response body
        #[arg(short, long)]
        body: bool,

        /// Also print up to N initiator stack frames
        #[arg(short, long)]
        stack: Option<usize>,
    },

    /// Capture the focused page as PNG
    Screenshot {
        /// Output file (default: ~/.netwatch/screenshots/screenshot-<unix>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overall timeout in seconds (overrides config screenshot.defaultTimeoutSecs)
        #[arg(long)]
        timeout_secs: Option<f64>,
    },

    /// Inspect and run the registered tools
    Tools {
        #[command(subcommand)]
        command: ToolsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ToolsCommands {
    /// List registered tools
    List,
    /// Show a tool's parameters
    Info {
        /// Tool name
        tool_name: String,
    },
    /// Run a tool against the connected browser
    Run {
        /// Tool name
        tool_name: String,
        /// Parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let opts = GlobalOpts {
        host: cli.host,
        port: cli.port,
        config: cli.config,
    };

    match cli.command {
        Commands::Watch {
            duration_secs,
            resource_type,
            errors,
        } => {
            commands::watch::run(&opts, duration_secs, &resource_type, errors).await?;
        }
        Commands::Inspect {
            pattern,
            wait_secs,
            body,
            stack,
        } => {
            commands::inspect::run(&opts, &pattern, wait_secs, body, stack).await?;
        }
        Commands::Screenshot {
            output,
            timeout_secs,
        } => {
            commands::screenshot::run(&opts, output, timeout_secs).await?;
        }
        Commands::Tools { command } => match command {
            ToolsCommands::List => {
                commands::tools_cmd::list(&opts).await?;
            }
            ToolsCommands::Info { tool_name } => {
                commands::tools_cmd::info(&opts, &tool_name).await?;
            }
            ToolsCommands::Run { tool_name, params } => {
                commands::tools_cmd::run(&opts, &tool_name, &params).await?;
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show(&opts).await?;
            }
            ConfigCommands::Init { force } => {
                commands::config_cmd::init(&opts, force).await?;
            }
        },
    }

    Ok(())
}
