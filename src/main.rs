use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod decoder;
mod display;
mod eject;
mod input;
mod media;
mod mixer;
mod player;
mod runtime;

/// Command-line arguments for musicbox.
#[derive(Parser, Debug)]
#[command(name = "musicbox")]
#[command(about = "Playback controller for a headless USB music appliance")]
#[command(version)]
pub struct Args {
    /// Session mode: `auto` plays whatever gets mounted; `interactive`
    /// additionally takes keyboard controls from the attached terminal.
    #[arg(short, long, value_enum, default_value = "auto", env = "MUSICBOX_MODE")]
    pub mode: runtime::Mode,

    /// Override the configured mount point of the removable medium.
    #[arg(long, env = "MUSICBOX_MOUNT_POINT")]
    pub mount_point: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "musicbox=info".into()),
        )
        .init();

    let args = Args::parse();
    runtime::run(args)
}
