//! ## utkik-cli
//! **Operational entrypoint for the probe**
//!
//! Three modes: `serve` runs the REST control surface and waits for start
//! requests, `capture` runs one live session and exits, `replay` pushes a
//! scenario file through the same pipeline.

use clap::Parser;

use utkik_telemetry::logging::EventLogger;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    EventLogger::init();
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(config, args).await,
        Commands::Capture(args) => commands::run_capture(config, args).await,
        Commands::Replay(args) => commands::run_replay(config, args).await,
    }
}
