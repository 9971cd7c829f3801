use std::path::PathBuf;

use anyhow::{Context, Result};
use bridge_client::HttpForwarder;
use clap::{Parser, Subcommand};
use native_host::{BridgeLoop, manifest::HostManifest};
use tracing::{Level, debug, info};
use utils::{
    config::{default_config_path, default_log_dir, load_bridge_config},
    logging::{self, get_native_host_config, parse_level},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to native-host.json, defaults to the per-user app directory
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set log level
    #[arg(long = "log-level", value_name = "LEVEL",
          value_parser = ["trace", "debug", "info", "warn", "error"],
          default_value = "info")]
    log_level: String,

    /// Directory for log files
    #[arg(long = "log-dir", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    /// Arguments the browser appends: caller origin, manifest path, parent window
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    browser_args: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the native messaging host manifest
    Manifest {
        /// Host binary the browser should launch, defaults to this executable
        #[arg(long = "path", value_name = "BINARY")]
        path: Option<PathBuf>,

        /// Chromium extension origin or id, repeatable
        #[arg(long = "allowed-origin", value_name = "ORIGIN")]
        allowed_origins: Vec<String>,

        /// Firefox extension id, repeatable
        #[arg(long = "allowed-extension", value_name = "ID")]
        allowed_extensions: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Manifest {
        path,
        allowed_origins,
        allowed_extensions,
    }) = cli.command
    {
        let path = match path {
            Some(path) => path,
            None => std::env::current_exe().context("Failed to locate host executable")?,
        };
        let manifest = HostManifest::new(&path)
            .with_origins(allowed_origins)
            .with_extensions(allowed_extensions);
        println!("{}", manifest.to_json_pretty()?);
        return Ok(());
    }

    let max_level = parse_level(&cli.log_level).unwrap_or(Level::INFO);
    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    match logging::init_logging(get_native_host_config(log_dir, max_level)) {
        Ok(_) => debug!("Logger initialized for native host"),
        Err(e) => eprintln!("Failed to initialize logger: {}", e),
    }
    if !cli.browser_args.is_empty() {
        debug!("launched with {:?}", cli.browser_args);
    }

    let config_path = cli.config.or_else(default_config_path);
    let config = load_bridge_config(config_path.as_deref());
    info!("native host starting, endpoint {}", config.endpoint());

    let forwarder = HttpForwarder::new().context("Failed to build HTTP client")?;
    let stats = BridgeLoop::new(tokio::io::stdin(), tokio::io::stdout(), &forwarder, &config)
        .run()
        .await
        .context("Native messaging channel failed")?;

    info!(
        "native host exiting, {} responses ({} failed)",
        stats.responses, stats.failures
    );
    Ok(())
}
