//! Single-consumer control loop: the only writer of playback state.
//!
//! Observer threads deliver `ControlEvent`s through the bounded queue; this
//! loop serializes them, drives the decoder deck and the collaborators, and
//! polls for natural end-of-track on the receive-timeout tick. Stopping an
//! already-exited decode is a no-op, so a skip racing a natural exit is
//! handled correctly in either arrival order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, info, warn};

use crate::decoder::Deck;
use crate::display::{self, StatusSink};
use crate::eject::{EjectCoordinator, EjectError};
use crate::input::{ControlEvent, EventReceiver, InputEvent};
use crate::mixer::Mixer;

use super::state::{DeckCommand, MediaAvailability, Player};

/// Why the control loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Orderly shutdown (quit key or session teardown).
    Shutdown,
    /// Every producer is gone and the queue disconnected. The session
    /// should be rebuilt from scratch.
    QueueDisconnected,
}

/// Drain the control queue until shutdown. `tick` bounds how long the loop
/// waits for an event before polling the deck for decoder exit.
pub fn run(
    player: &mut Player,
    deck: &mut Deck,
    eject: &mut EjectCoordinator,
    mixer: &Mixer,
    display: &dyn StatusSink,
    events: &EventReceiver,
    suppressed: &Arc<AtomicBool>,
    tick: Duration,
) -> LoopExit {
    if player.media() == MediaAvailability::Absent {
        display.show(display::WAITING);
    }

    loop {
        match events.recv_timeout(tick) {
            Ok(event) => {
                if let Some(exit) =
                    handle_event(event, player, deck, eject, mixer, display, suppressed)
                {
                    deck.stop();
                    return exit;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // Idle tick: did the decoder finish the track on its own?
                if let Some(exit) = deck.poll_exited() {
                    if !exit.clean {
                        debug!("treating decoder error exit as end of track");
                    }
                    if player.track_finished().is_some() {
                        start_track(player, deck, display);
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                deck.stop();
                return LoopExit::QueueDisconnected;
            }
        }
    }
}

fn handle_event(
    event: ControlEvent,
    player: &mut Player,
    deck: &mut Deck,
    eject: &mut EjectCoordinator,
    mixer: &Mixer,
    display: &dyn StatusSink,
    suppressed: &Arc<AtomicBool>,
) -> Option<LoopExit> {
    match event {
        ControlEvent::MountAppeared(playlist) => {
            info!(tracks = playlist.len(), "medium mounted");
            if player.mount(playlist) {
                start_track(player, deck, display);
            } else if player.media() == MediaAvailability::Mounted && !player.has_tracks() {
                display.show(display::NO_TRACKS);
            }
        }
        ControlEvent::MountDisappeared => {
            deck.stop();
            player.unmount();
            if player.media() == MediaAvailability::Absent {
                display.show(display::WAITING);
            }
        }
        ControlEvent::Input(input) => {
            handle_input(input, player, deck, eject, mixer, display, suppressed);
        }
        ControlEvent::Shutdown => return Some(LoopExit::Shutdown),
    }
    None
}

fn handle_input(
    input: InputEvent,
    player: &mut Player,
    deck: &mut Deck,
    eject: &mut EjectCoordinator,
    mixer: &Mixer,
    display: &dyn StatusSink,
    suppressed: &Arc<AtomicBool>,
) {
    match input {
        InputEvent::PlayPause => match player.play_pause() {
            DeckCommand::Stop => {
                deck.stop();
                if let Some(track) = player.current() {
                    display.show(&display::paused(track));
                }
            }
            DeckCommand::Start(_) => start_track(player, deck, display),
            DeckCommand::None => {}
        },
        InputEvent::Next => {
            if player.next().is_some() {
                start_track(player, deck, display);
            }
        }
        InputEvent::Previous => {
            if player.previous().is_some() {
                start_track(player, deck, display);
            }
        }
        InputEvent::VolumeDelta(delta) => {
            let volume = player.apply_volume_delta(delta);
            mixer.apply(volume);
            display.show(&display::volume(volume));
        }
        InputEvent::EncoderPress => {
            handle_encoder_press(player, deck, eject, display, suppressed);
        }
    }
}

/// The encoder button toggles between "safe to remove" and normal service.
fn handle_encoder_press(
    player: &mut Player,
    deck: &mut Deck,
    eject: &mut EjectCoordinator,
    display: &dyn StatusSink,
    suppressed: &Arc<AtomicBool>,
) {
    match player.media() {
        MediaAvailability::Mounted => {
            deck.stop();
            match eject.eject() {
                Ok(()) => {
                    suppressed.store(true, Ordering::SeqCst);
                    player.mark_ejected();
                    display.show(display::EJECTED);
                }
                Err(EjectError::UnmountBusy(err)) => {
                    warn!(%err, "eject refused; medium still mounted");
                    player.eject_refused();
                    display.show(display::EJECT_BUSY);
                }
                Err(EjectError::DeviceAbsent) => {
                    // The watcher hasn't reported the unmount yet.
                    warn!("eject requested but medium already gone");
                    player.unmount();
                }
            }
        }
        MediaAvailability::ManuallyEjected => {
            eject.reenable();
            suppressed.store(false, Ordering::SeqCst);
            player.mark_reenabled();
            display.show(display::WAITING);
        }
        MediaAvailability::Absent => {
            debug!("eject requested with no medium; ignoring");
        }
    }
}

/// Start the player's current track, skipping over tracks whose decode
/// cannot be spawned. Gives up after one full lap of spawn failures.
fn start_track(player: &mut Player, deck: &mut Deck, display: &dyn StatusSink) {
    let attempts = player.track_count();
    if attempts == 0 {
        return;
    }
    for _ in 0..attempts {
        let Some(track) = player.current() else {
            return;
        };
        match deck.start(track, player.volume()) {
            Ok(()) => {
                display.show(&display::now_playing(
                    track,
                    player.index(),
                    player.track_count(),
                    player.volume(),
                ));
                return;
            }
            Err(err) => {
                warn!(%err, track = %track.path.display(), "skipping track");
                if player.next().is_none() {
                    break;
                }
            }
        }
    }
    warn!("no track could be started; stopping");
    player.halt();
    display.show(display::PLAYBACK_ERROR);
}
