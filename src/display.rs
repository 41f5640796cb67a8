//! Display collaborator: short status lines, fire-and-forget.
//!
//! The appliance's panel process consumes these lines; with no panel
//! attached the console sink doubles as the front panel. A sink must never
//! block the control loop and never fail loudly.

use crate::media::Track;

pub trait StatusSink: Send {
    /// Push one short status line, best-effort.
    fn show(&self, line: &str);
}

/// Writes status lines to stdout. In raw terminal mode (interactive
/// sessions) lines need an explicit carriage return.
pub struct ConsoleStatus {
    raw_terminal: bool,
}

impl ConsoleStatus {
    pub fn new(raw_terminal: bool) -> Self {
        Self { raw_terminal }
    }
}

impl StatusSink for ConsoleStatus {
    fn show(&self, line: &str) {
        if self.raw_terminal {
            print!("{line}\r\n");
        } else {
            println!("{line}");
        }
    }
}

pub const WAITING: &str = "Waiting for USB...";
pub const EJECTED: &str = "USB EJECTED - Safe to Remove";
pub const EJECT_BUSY: &str = "Eject failed - device busy";
pub const NO_TRACKS: &str = "No tracks found";
pub const PLAYBACK_ERROR: &str = "Playback error";

pub fn now_playing(track: &Track, index: usize, total: usize, volume: u8) -> String {
    let mut line = format!("Playing: {} [{}/{}]", track.title, index + 1, total);
    if let Some(duration) = track.duration {
        let secs = duration.as_secs();
        line.push_str(&format!(" {}:{:02}", secs / 60, secs % 60));
    }
    line.push_str(&format!(" vol {volume}%"));
    line
}

pub fn paused(track: &Track) -> String {
    format!("Paused: {}", track.title)
}

pub fn volume(volume: u8) -> String {
    format!("Volume: {volume}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn now_playing_is_one_based_and_carries_volume() {
        let track = Track {
            path: PathBuf::from("/mnt/usbdrive/a.mp3"),
            title: "Morning Song".into(),
            duration: None,
        };
        assert_eq!(
            now_playing(&track, 0, 12, 80),
            "Playing: Morning Song [1/12] vol 80%"
        );
        assert_eq!(paused(&track), "Paused: Morning Song");
        assert_eq!(volume(5), "Volume: 5%");
    }

    #[test]
    fn now_playing_includes_duration_when_known() {
        let track = Track {
            path: PathBuf::from("/mnt/usbdrive/a.mp3"),
            title: "Morning Song".into(),
            duration: Some(std::time::Duration::from_secs(245)),
        };
        assert_eq!(
            now_playing(&track, 2, 12, 60),
            "Playing: Morning Song [3/12] 4:05 vol 60%"
        );
    }
}
