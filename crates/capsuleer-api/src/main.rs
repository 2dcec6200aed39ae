//! Main entry point for the Capsuleer API service

use capsuleer_api::{config::Config, server::Server, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "capsuleer-api", about = "Capsuleer auth service", version, author)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging using the unified system
    let log_filter = format!("{}=info", env!("CARGO_BIN_NAME").replace("-", "_"));
    capsuleer_common::logging::init_logging(&args.verbosity, &log_filter)?;

    info!("Starting Capsuleer API v{}", capsuleer_api::VERSION);

    // Handle config generation
    if args.gen_config {
        let example_config = Config::generate_example()?;
        println!("{example_config}");
        return Ok(());
    }

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    // Create and run server
    let server = Server::new(config)?;

    info!("Capsuleer API initialized successfully");

    // Run until shutdown signal
    match server.run().await {
        Ok(()) => {
            info!("Capsuleer API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Capsuleer API error: {}", e);
            Err(e)
        }
    }
}
