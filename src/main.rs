//! MergeX clip merger
//!
//! Joins video clips end to end through one ffmpeg filter graph, with
//! optional speed, resolution and volume changes.
//!
//! # Usage
//!
//! ```bash
//! merger merge a.mp4 b.mp4 c.mp4 --speed 1.5 --resolution 640x480 --output out.mp4
//! merger plan a.mp4 b.mp4 --volume 2
//! merger merge --request request.json --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use mergex_cli::app::DefaultAppContainer;
use mergex_cli::cli::{commands, Cli, Commands, LogFormat};
use mergex_cli::config_initialization::initialize_configuration_hierarchy;
use mergex_cli::MergeXError;

/// Filter for `level`, unless RUST_LOG is set
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mergex_cli={0},merger={0}", level)))
}

/// Main entry point for the MergeX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging before configuration so its messages are kept;
    // the filter is swapped for the configured level afterwards.
    let (filter, filter_handle) =
        reload::Layer::new(log_filter(cli.log_level.as_deref().unwrap_or("info")));
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    let config = initialize_configuration_hierarchy(&cli).map_err(MergeXError::from)?;
    filter_handle.reload(log_filter(&config.log_level))?;

    info!("Starting MergeX clip merger");

    match cli.command {
        Commands::Merge(args) => {
            info!("Executing merge command");
            let container = DefaultAppContainer::new(&config).map_err(MergeXError::from)?;
            commands::merge(&container, args).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(&config.ffmpeg_path, args)?;
        }
    }

    info!("MergeX completed successfully");
    Ok(())
}
