//! Decoder child-process handle.
//!
//! Actual audio decoding is delegated to an external process (`mpg123` by
//! default). This module owns the single live child at a time: every start
//! goes through the `Deck` slot, which stops and reaps any previous child
//! first, so two in-flight decodes cannot exist by construction.

use std::process::{Child, Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

use crate::command::render_arg;
use crate::config::DecoderSettings;
use crate::media::Track;

/// The decoder could not be started (missing binary, unreadable file).
#[derive(Debug, Error)]
#[error("failed to spawn decoder `{program}`: {source}")]
pub struct SpawnError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

/// Exit report for a finished decode.
#[derive(Debug, Clone, Copy)]
pub struct DecodeExit {
    /// True when the decoder exited with status 0 (natural end of track).
    /// An error exit is handled the same way upstream, just logged.
    pub clean: bool,
}

/// The single decoder slot.
pub struct Deck {
    settings: DecoderSettings,
    current: Option<Child>,
}

impl Deck {
    pub fn new(settings: DecoderSettings) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// True while the slot is occupied. The child may already have exited
    /// without `poll_exited` having observed it yet.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Start decoding `track`, replacing any live decode.
    ///
    /// A spawn that succeeds but errors out immediately is not detected
    /// here; it surfaces as an early exit on the next `poll_exited`, so the
    /// controller never mistakes a dead decoder for a playing one.
    pub fn start(&mut self, track: &Track, volume: u8) -> Result<(), SpawnError> {
        self.stop();

        let file = track.path.to_string_lossy();
        let vol = volume.to_string();
        let mut cmd = Command::new(&self.settings.program);
        for arg in &self.settings.args {
            cmd.arg(render_arg(arg, &[("{file}", &file), ("{volume}", &vol)]));
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|source| SpawnError {
            program: self.settings.program.clone(),
            source,
        })?;
        debug!(pid = child.id(), track = %track.path.display(), "decoder started");
        self.current = Some(child);
        Ok(())
    }

    /// Stop and reap the live decode, if any. Idempotent: stopping an empty
    /// slot or an already-exited child is a no-op.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            // kill() errors when the child already exited; the wait below
            // reaps it either way.
            let _ = child.kill();
            match child.wait() {
                Ok(status) => debug!(%status, "decoder stopped"),
                Err(err) => warn!(%err, "failed to reap decoder"),
            }
        }
    }

    /// Non-blocking exit probe; clears the slot when the child is gone.
    pub fn poll_exited(&mut self) -> Option<DecodeExit> {
        let polled = self.current.as_mut()?.try_wait();
        match polled {
            Ok(None) => None,
            Ok(Some(status)) => {
                self.current = None;
                let clean = status.success();
                if !clean {
                    warn!(%status, "decoder exited with error");
                }
                Some(DecodeExit { clean })
            }
            Err(err) => {
                warn!(%err, "decoder poll failed; stopping");
                self.stop();
                Some(DecodeExit { clean: false })
            }
        }
    }
}

impl Drop for Deck {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn track(path: &str) -> Track {
        Track {
            path: PathBuf::from(path),
            title: "t".into(),
            duration: None,
        }
    }

    fn make_deck(program: &str, args: &[&str]) -> Deck {
        Deck::new(DecoderSettings {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn wait_for_exit(deck: &mut Deck) -> DecodeExit {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(exit) = deck.poll_exited() {
                return exit;
            }
            assert!(Instant::now() < deadline, "decoder never exited");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let mut deck = make_deck("musicbox-no-such-decoder", &[]);
        let err = deck.start(&track("/tmp/a.mp3"), 80).unwrap_err();
        assert_eq!(err.program, "musicbox-no-such-decoder");
        assert!(!deck.is_active());
    }

    #[test]
    fn clean_exit_is_observed_and_clears_the_slot() {
        let mut deck = make_deck("true", &[]);
        deck.start(&track("/tmp/a.mp3"), 80).unwrap();
        assert!(deck.is_active());

        let exit = wait_for_exit(&mut deck);
        assert!(exit.clean);
        assert!(!deck.is_active());
    }

    #[test]
    fn error_exit_is_observed_as_not_clean() {
        let mut deck = make_deck("false", &[]);
        deck.start(&track("/tmp/a.mp3"), 80).unwrap();
        let exit = wait_for_exit(&mut deck);
        assert!(!exit.clean);
    }

    #[test]
    fn starting_replaces_the_live_decode() {
        let mut deck = make_deck("sleep", &["5"]);
        deck.start(&track("/tmp/a.mp3"), 80).unwrap();
        let first_pid = deck.current.as_ref().unwrap().id();

        deck.start(&track("/tmp/b.mp3"), 80).unwrap();
        let second_pid = deck.current.as_ref().unwrap().id();

        assert_ne!(first_pid, second_pid);
        assert!(deck.is_active());
        deck.stop();
        assert!(!deck.is_active());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut deck = make_deck("sleep", &["5"]);
        deck.start(&track("/tmp/a.mp3"), 80).unwrap();
        deck.stop();
        deck.stop();
        assert!(deck.poll_exited().is_none());
    }

    #[test]
    fn file_placeholder_reaches_the_decoder_argv() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.mp3");
        std::fs::write(&file, b"x").unwrap();

        let mut deck = make_deck("sh", &["-c", "test -f '{file}'"]);
        deck.start(&track(file.to_str().unwrap()), 80).unwrap();
        assert!(wait_for_exit(&mut deck).clean);

        let mut deck = make_deck("sh", &["-c", "test -f '{file}'"]);
        deck.start(&track("/definitely/not/here.mp3"), 80).unwrap();
        assert!(!wait_for_exit(&mut deck).clean);
    }
}
