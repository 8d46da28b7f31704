use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::time::sleep;
use tracing::info;

use utkik_api::ApiState;
use utkik_capture::{ScriptedSourceFactory, TsharkSourceFactory};
use utkik_config::UtkikConfig;
use utkik_engine::CaptureController;

#[derive(Parser)]
#[command(name = "utkik", version, about = "Passive traffic probe with a REST control surface")]
pub struct Cli {
    /// Configuration file; defaults plus UTKIK_* environment otherwise.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the REST control surface; sessions start on request
    Serve(ServeArgs),
    /// Run one live capture session and exit
    Capture(CaptureArgs),
    /// Replay a YAML scenario through the pipeline and exit
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Interface to capture on; the configured one otherwise
    #[arg(short, long)]
    pub interface: Option<String>,
    /// Cap the session at this many seconds
    #[arg(short, long)]
    pub duration: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Scenario file: a YAML list of dissected packets
    #[arg(short, long)]
    pub scenario: PathBuf,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<UtkikConfig> {
    let config = match path {
        Some(path) => UtkikConfig::load_from_path(path)?,
        None => UtkikConfig::load()?,
    };
    Ok(config)
}

pub async fn run_serve(config: UtkikConfig, args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = args.bind.unwrap_or_else(|| config.api.bind.clone()).parse()?;
    let factory = Arc::new(TsharkSourceFactory::new(config.capture.batch_size));
    let controller = CaptureController::new(config, factory);
    let state = Arc::new(ApiState::new(controller));

    utkik_api::serve(addr, state).await?;
    Ok(())
}

pub async fn run_capture(mut config: UtkikConfig, args: CaptureArgs) -> anyhow::Result<()> {
    if let Some(duration) = args.duration {
        config.capture.max_session_secs = duration;
    }
    let factory = Arc::new(TsharkSourceFactory::new(config.capture.batch_size));
    let controller = CaptureController::new(config, factory);

    controller.start(args.interface, None).await?;
    drive_session(&controller).await
}

pub async fn run_replay(config: UtkikConfig, args: ReplayArgs) -> anyhow::Result<()> {
    let factory = Arc::new(ScriptedSourceFactory::from_scenario_file(&args.scenario)?);
    let controller = CaptureController::new(config, factory);

    controller.start(None, None).await?;
    drive_session(&controller).await
}

/// Waits for the session to end on its own, stopping it early on Ctrl-C,
/// then reports the session counters.
async fn drive_session(controller: &CaptureController) -> anyhow::Result<()> {
    tokio::select! {
        _ = wait_until_stopped(controller) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, stopping capture");
            controller.stop().await?;
        }
    }
    controller.wait_for_session_end().await?;

    let stats = controller.status();
    info!(
        packets = stats.packets_seen,
        http = stats.http_count,
        tls = stats.tls_count,
        dns = stats.dns_count,
        "capture session finished"
    );
    Ok(())
}

async fn wait_until_stopped(controller: &CaptureController) {
    while controller.status().running {
        sleep(Duration::from_millis(100)).await;
    }
}
