//! System mixer volume.
//!
//! Playback volume is a property of the output device, not of the decoder,
//! so it is pushed through an external mixer command (`amixer set PCM N%`
//! by default) and applies in every playback state, including stopped.

use tracing::warn;

use crate::command;
use crate::config::MixerSettings;

pub struct Mixer {
    settings: MixerSettings,
}

impl Mixer {
    pub fn new(settings: MixerSettings) -> Self {
        Self { settings }
    }

    /// Push `volume` (percent) to the system mixer. Best-effort: a missing
    /// or failing mixer tool is logged and otherwise ignored.
    pub fn apply(&self, volume: u8) {
        if !self.settings.enabled {
            return;
        }
        let vol = volume.to_string();
        if let Err(err) = command::run(
            &self.settings.program,
            &self.settings.args,
            &[("{volume}", &vol)],
        ) {
            warn!(%err, volume, "failed to set mixer volume");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mixer_never_runs_anything() {
        let mixer = Mixer::new(MixerSettings {
            enabled: false,
            program: "musicbox-no-such-mixer".into(),
            args: vec![],
        });
        // Would log a warning if it tried to run; mainly this must not panic.
        mixer.apply(50);
    }

    #[test]
    fn mixer_failures_are_swallowed() {
        let mixer = Mixer::new(MixerSettings {
            enabled: true,
            program: "false".into(),
            args: vec![],
        });
        mixer.apply(50);

        let mixer = Mixer::new(MixerSettings {
            enabled: true,
            program: "musicbox-no-such-mixer".into(),
            args: vec![],
        });
        mixer.apply(50);
    }
}
