use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/musicbox/config.toml` or
/// `~/.config/musicbox/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MUSICBOX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub media: MediaSettings,
    pub decoder: DecoderSettings,
    pub mixer: MixerSettings,
    pub playback: PlaybackSettings,
    pub eject: EjectSettings,
    pub input: InputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media: MediaSettings::default(),
            decoder: DecoderSettings::default(),
            mixer: MixerSettings::default(),
            playback: PlaybackSettings::default(),
            eject: EjectSettings::default(),
            input: InputSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Where the OS automounter puts the removable medium.
    pub mount_point: PathBuf,
    /// How the watcher decides whether the medium is mounted.
    pub mount_probe: MountProbe,
    /// Poll interval for mount-state edges (milliseconds).
    pub poll_interval_ms: u64,
    /// File extensions to treat as playable (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files (dotfiles, `._` AppleDouble junk).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from("/mnt/usbdrive"),
            mount_probe: MountProbe::Procfs,
            poll_interval_ms: 500,
            extensions: vec!["mp3".into()],
            follow_links: false,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MountProbe {
    /// Parse `/proc/mounts` for the mount point (the appliance default).
    Procfs,
    /// Treat an existing directory as mounted (tests and desktop use).
    #[serde(alias = "path", alias = "path_exists")]
    PathExists,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Decoder program, e.g. `mpg123`.
    pub program: String,
    /// Argument template. `{file}` expands to the track path, `{volume}`
    /// to the current volume percentage.
    pub args: Vec<String>,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            program: "mpg123".into(),
            args: vec!["-q".into(), "{file}".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    /// Whether volume changes are pushed to the system mixer at all.
    pub enabled: bool,
    /// Mixer program, e.g. `amixer`.
    pub program: String,
    /// Argument template; `{volume}` expands to the volume percentage.
    pub args: Vec<String>,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "amixer".into(),
            args: vec!["set".into(), "PCM".into(), "{volume}%".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume at startup (percent, clamped to 100).
    pub initial_volume: u8,
    /// Volume step for the +/- buttons (percent).
    pub button_volume_step: i32,
    /// Volume step per rotary-encoder detent (percent).
    pub encoder_volume_step: i32,
    /// Idle tick of the control loop (milliseconds); this is also how often
    /// decoder exit is checked for auto-advance.
    pub tick_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 80,
            button_volume_step: 5,
            encoder_volume_step: 2,
            tick_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EjectSettings {
    /// Filesystem flush command run before unmounting.
    pub sync_program: String,
    pub sync_args: Vec<String>,
    /// Unmount command; `{mount_point}` expands to the configured mount point.
    pub unmount_program: String,
    pub unmount_args: Vec<String>,
    /// Optional USB bus-power control (uhubctl-style). Absence of the tool
    /// at runtime is a reduced capability, not an error.
    pub power: Option<PowerSettings>,
}

impl Default for EjectSettings {
    fn default() -> Self {
        Self {
            sync_program: "sync".into(),
            sync_args: vec![],
            unmount_program: "umount".into(),
            unmount_args: vec!["{mount_point}".into()],
            power: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    pub program: String,
    /// `{location}` and `{port}` expand into both argument templates.
    pub off_args: Vec<String>,
    pub on_args: Vec<String>,
    /// Hub location as the power tool names it, e.g. `1-1`.
    pub location: String,
    /// Hub port the medium hangs off.
    pub port: String,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            program: "uhubctl".into(),
            off_args: vec![
                "-l".into(),
                "{location}".into(),
                "-p".into(),
                "{port}".into(),
                "-a".into(),
                "off".into(),
            ],
            on_args: vec![
                "-l".into(),
                "{location}".into(),
                "-p".into(),
                "{port}".into(),
                "-a".into(),
                "on".into(),
            ],
            location: "1-1".into(),
            port: "2".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Capacity of the control event queue. When full, the oldest queued
    /// event is dropped (and logged); events are not precious.
    pub queue_capacity: usize,
    /// Keyboard poll interval in interactive mode (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            poll_interval_ms: 50,
        }
    }
}
