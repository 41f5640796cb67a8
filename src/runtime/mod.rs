//! Session wiring: builds the collaborators, spawns the observer threads
//! and supervises the control loop.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{error, info};

use crate::Args;
use crate::config;
use crate::decoder::Deck;
use crate::display::ConsoleStatus;
use crate::eject::EjectCoordinator;
use crate::input;
use crate::media;
use crate::mixer::Mixer;
use crate::player::{self, LoopExit, Player};

mod startup;

/// Session mode selected on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Headless: mount-triggered auto-play and physical controls only.
    Auto,
    /// Additionally takes keyboard controls from the attached terminal.
    Interactive,
}

pub fn run(args: Args) -> Result<()> {
    let settings = startup::load_settings(&args);
    info!(
        mode = ?args.mode,
        mount_point = %settings.media.mount_point.display(),
        "musicbox starting"
    );

    if args.mode == Mode::Interactive {
        enable_raw_mode()?;
    }
    let result = supervise(&settings, args.mode);
    if args.mode == Mode::Interactive {
        disable_raw_mode()?;
    }
    result
}

/// Run sessions until an orderly shutdown. A fatal loop exit (the control
/// queue dying underneath us) gets a full rebuild of the controller and its
/// observers rather than taking the process down.
fn supervise(settings: &config::Settings, mode: Mode) -> Result<()> {
    loop {
        match session(settings, mode) {
            LoopExit::Shutdown => {
                info!("shutdown requested");
                return Ok(());
            }
            LoopExit::QueueDisconnected => {
                error!("control queue disconnected; restarting controller");
            }
        }
    }
}

fn session(settings: &config::Settings, mode: Mode) -> LoopExit {
    let (events_tx, events_rx) = input::channel(settings.input.queue_capacity);
    let suppressed = Arc::new(AtomicBool::new(false));

    let _watcher = media::watcher::spawn(
        settings.media.clone(),
        events_tx.clone(),
        suppressed.clone(),
    );
    if mode == Mode::Interactive {
        let _keyboard = input::spawn_keyboard(
            settings.input.clone(),
            settings.playback.button_volume_step,
            events_tx.clone(),
        );
    }

    let mut player = Player::new(settings.playback.initial_volume);
    let mut deck = Deck::new(settings.decoder.clone());
    let mut eject = EjectCoordinator::new(settings.eject.clone(), settings.media.clone());
    let mixer = Mixer::new(settings.mixer.clone());
    let display = ConsoleStatus::new(mode == Mode::Interactive);

    mixer.apply(player.volume());

    player::run(
        &mut player,
        &mut deck,
        &mut eject,
        &mixer,
        &display,
        &events_rx,
        &suppressed,
        Duration::from_millis(settings.playback.tick_ms),
    )
}
