//! The playback state machine, free of I/O.
//!
//! Two explicit axes: `PlaybackState` (stopped/playing/paused) and
//! `MediaAvailability` (absent/mounted/manually-ejected), so the transition
//! table stays exhaustive and reviewable instead of a pile of booleans.
//! Only the control loop writes this state.

use crate::media::Track;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaAvailability {
    /// No medium mounted.
    Absent,
    /// Medium mounted and eligible for playback.
    Mounted,
    /// The user ejected the medium. Persists even while the medium stays
    /// electrically present; only an explicit re-enable leaves it, never
    /// a mount/unmount hardware event on its own.
    ManuallyEjected,
}

/// What the deck should do after a play/pause transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    None,
    Stop,
    /// Start decoding the track at this playlist index.
    Start(usize),
}

pub struct Player {
    playlist: Vec<Track>,
    index: usize,
    playback: PlaybackState,
    media: MediaAvailability,
    volume: u8,
}

impl Player {
    pub fn new(initial_volume: u8) -> Self {
        Self {
            playlist: Vec::new(),
            index: 0,
            playback: PlaybackState::Stopped,
            media: MediaAvailability::Absent,
            volume: initial_volume.min(100),
        }
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn media(&self) -> MediaAvailability {
        self.media
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn track_count(&self) -> usize {
        self.playlist.len()
    }

    pub fn current(&self) -> Option<&Track> {
        self.playlist.get(self.index)
    }

    pub fn has_tracks(&self) -> bool {
        !self.playlist.is_empty()
    }

    /// Replace the playlist wholesale after a mount. Returns true when
    /// auto-play should start at index 0. Ignored entirely while manually
    /// ejected: only an explicit re-enable lifts that state, and the
    /// watcher should not have forwarded the event in the first place.
    pub fn mount(&mut self, playlist: Vec<Track>) -> bool {
        if self.media == MediaAvailability::ManuallyEjected {
            return false;
        }
        self.playlist = playlist;
        self.index = 0;
        self.media = MediaAvailability::Mounted;
        if self.playlist.is_empty() {
            self.playback = PlaybackState::Stopped;
            false
        } else {
            self.playback = PlaybackState::Playing;
            true
        }
    }

    /// The medium went away underneath us: clear the playlist and stop.
    /// A manual eject is not cleared by the hardware event.
    pub fn unmount(&mut self) {
        self.playlist.clear();
        self.index = 0;
        self.playback = PlaybackState::Stopped;
        if self.media == MediaAvailability::Mounted {
            self.media = MediaAvailability::Absent;
        }
    }

    /// Play/pause toggle. Pausing stops the decode; resuming restarts the
    /// current track. From stopped (with a mounted, non-empty playlist)
    /// this starts the current track.
    pub fn play_pause(&mut self) -> DeckCommand {
        if self.media != MediaAvailability::Mounted || self.playlist.is_empty() {
            return DeckCommand::None;
        }
        match self.playback {
            PlaybackState::Playing => {
                self.playback = PlaybackState::Paused;
                DeckCommand::Stop
            }
            PlaybackState::Paused | PlaybackState::Stopped => {
                self.playback = PlaybackState::Playing;
                DeckCommand::Start(self.index)
            }
        }
    }

    /// Skip forward on the ring. Returns the new index to start, if any.
    pub fn next(&mut self) -> Option<usize> {
        self.skip(1)
    }

    /// Skip backward on the ring.
    pub fn previous(&mut self) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        self.skip(len - 1)
    }

    fn skip(&mut self, delta: usize) -> Option<usize> {
        if self.media != MediaAvailability::Mounted || self.playlist.is_empty() {
            return None;
        }
        self.index = (self.index + delta) % self.playlist.len();
        self.playback = PlaybackState::Playing;
        Some(self.index)
    }

    /// The decoder finished on its own: auto-advance while playing. A stale
    /// exit observed after pause/stop is ignored, which is what makes a
    /// skip racing a natural exit safe in either order.
    pub fn track_finished(&mut self) -> Option<usize> {
        if self.playback != PlaybackState::Playing {
            return None;
        }
        self.skip(1)
    }

    /// Clamp and apply a volume delta. Volume is independent of both state
    /// axes and applies even when stopped or ejected.
    pub fn apply_volume_delta(&mut self, delta: i32) -> u8 {
        self.volume = (i32::from(self.volume) + delta).clamp(0, 100) as u8;
        self.volume
    }

    /// Playback could not continue (e.g. no track would start).
    pub fn halt(&mut self) {
        self.playback = PlaybackState::Stopped;
    }

    /// Record a completed eject: playlist gone, suppression active.
    pub fn mark_ejected(&mut self) {
        self.playlist.clear();
        self.index = 0;
        self.playback = PlaybackState::Stopped;
        self.media = MediaAvailability::ManuallyEjected;
    }

    /// Eject was refused (unmount busy). The decode has already been
    /// stopped by the caller; the medium stays mounted so a retry works.
    pub fn eject_refused(&mut self) {
        if self.media == MediaAvailability::Mounted {
            self.playback = PlaybackState::Stopped;
        }
    }

    /// Record a re-enable: suppression lifted, medium reported absent until
    /// the OS delivers a fresh mount event. A mount is never synthesized.
    pub fn mark_reenabled(&mut self) {
        if self.media == MediaAvailability::ManuallyEjected {
            self.media = MediaAvailability::Absent;
        }
    }
}
