//! Safe-eject and re-enable protocol for the removable medium.
//!
//! Eject: flush, unmount, optionally cut upstream USB power. Re-enable:
//! restore power and nothing else; the next mount event from the OS is
//! what brings playback back, and a mount is never synthesized here.

use thiserror::Error;
use tracing::{info, warn};

use crate::command::{self, CommandError};
use crate::config::{EjectSettings, MediaSettings};
use crate::media;

#[derive(Debug, Error)]
pub enum EjectError {
    /// Eject requested while no medium is mounted; a no-op for the caller.
    #[error("no medium mounted")]
    DeviceAbsent,
    /// The unmount was refused (typically "device busy"); nothing has been
    /// unmounted and the caller may retry after clearing busy handles.
    #[error("unmount refused: {0}")]
    UnmountBusy(CommandError),
}

pub struct EjectCoordinator {
    settings: EjectSettings,
    media: MediaSettings,
    /// Whether the optional power-control tool exists. Probed on first use
    /// by attempting the real command, then cached; never probed again.
    power_available: Option<bool>,
    /// True while eject has cut upstream power, so re-enable knows to
    /// restore it.
    power_cut: bool,
}

impl EjectCoordinator {
    pub fn new(settings: EjectSettings, media: MediaSettings) -> Self {
        Self {
            settings,
            media,
            power_available: None,
            power_cut: false,
        }
    }

    /// Flush, unmount and (best-effort) cut bus power. The caller must have
    /// stopped the decoder first. On `UnmountBusy` the medium is still
    /// mounted and no state should transition.
    pub fn eject(&mut self) -> Result<(), EjectError> {
        if !media::is_mounted(&self.media) {
            return Err(EjectError::DeviceAbsent);
        }

        // Flush pending writes; a failed sync degrades to trying the
        // unmount anyway rather than aborting the protocol.
        if let Err(err) = command::run(&self.settings.sync_program, &self.settings.sync_args, &[]) {
            warn!(%err, "filesystem sync failed; attempting unmount anyway");
        }

        let mount_point = self.media.mount_point.to_string_lossy().into_owned();
        command::run(
            &self.settings.unmount_program,
            &self.settings.unmount_args,
            &[("{mount_point}", &mount_point)],
        )
        .map_err(EjectError::UnmountBusy)?;
        info!(%mount_point, "medium unmounted");

        self.set_power(false);
        Ok(())
    }

    /// Restore bus power if eject cut it. Leaves mounting entirely to the
    /// OS; the caller lifts the suppression flag.
    pub fn reenable(&mut self) {
        if self.power_cut {
            self.set_power(true);
        }
    }

    fn set_power(&mut self, on: bool) {
        if self.power_available == Some(false) {
            return;
        }
        let Some(power) = &self.settings.power else {
            return;
        };

        let args = if on { &power.on_args } else { &power.off_args };
        let vars = [
            ("{location}", power.location.as_str()),
            ("{port}", power.port.as_str()),
        ];
        match command::run(&power.program, args, &vars) {
            Ok(()) => {
                self.power_available = Some(true);
                self.power_cut = !on;
                info!(on, "usb bus power toggled");
            }
            Err(err) if err.is_missing_program() => {
                self.power_available = Some(false);
                info!(program = %power.program, "power-control tool not present; bus power control disabled");
            }
            Err(err) => {
                self.power_available = Some(true);
                warn!(%err, "bus power control failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MountProbe, PowerSettings};
    use tempfile::TempDir;

    fn mounted_media(dir: &TempDir) -> MediaSettings {
        MediaSettings {
            mount_point: dir.path().to_path_buf(),
            mount_probe: MountProbe::PathExists,
            ..MediaSettings::default()
        }
    }

    fn eject_settings(unmount_program: &str) -> EjectSettings {
        EjectSettings {
            sync_program: "true".into(),
            sync_args: vec![],
            unmount_program: unmount_program.into(),
            unmount_args: vec![],
            power: None,
        }
    }

    fn power(program: &str) -> PowerSettings {
        PowerSettings {
            program: program.into(),
            off_args: vec![],
            on_args: vec![],
            location: "1-1".into(),
            port: "2".into(),
        }
    }

    #[test]
    fn eject_succeeds_when_unmount_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = EjectCoordinator::new(eject_settings("true"), mounted_media(&dir));
        assert!(coordinator.eject().is_ok());
    }

    #[test]
    fn busy_unmount_is_reported_and_retriable() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = EjectCoordinator::new(eject_settings("false"), mounted_media(&dir));

        match coordinator.eject() {
            Err(EjectError::UnmountBusy(_)) => {}
            other => panic!("expected UnmountBusy, got {other:?}"),
        }
        // The medium is still there; a retry must be possible.
        assert!(media::is_mounted(&coordinator.media));
    }

    #[test]
    fn eject_while_absent_is_rejected() {
        let media = MediaSettings {
            mount_point: "/definitely/not/mounted/anywhere".into(),
            mount_probe: MountProbe::PathExists,
            ..MediaSettings::default()
        };
        let mut coordinator = EjectCoordinator::new(eject_settings("true"), media);
        assert!(matches!(coordinator.eject(), Err(EjectError::DeviceAbsent)));
    }

    #[test]
    fn failed_sync_degrades_to_unmount() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = eject_settings("true");
        settings.sync_program = "false".into();
        let mut coordinator = EjectCoordinator::new(settings, mounted_media(&dir));
        assert!(coordinator.eject().is_ok());
    }

    #[test]
    fn missing_power_tool_is_detected_once_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = eject_settings("true");
        settings.power = Some(power("musicbox-no-such-power-tool"));
        let mut coordinator = EjectCoordinator::new(settings, mounted_media(&dir));

        assert!(coordinator.eject().is_ok());
        assert_eq!(coordinator.power_available, Some(false));
        assert!(!coordinator.power_cut);

        // Second eject skips the probe entirely and stays fine.
        assert!(coordinator.eject().is_ok());
    }

    #[test]
    fn reenable_restores_power_only_if_it_was_cut() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = eject_settings("true");
        settings.power = Some(power("true"));
        let mut coordinator = EjectCoordinator::new(settings, mounted_media(&dir));

        assert!(coordinator.eject().is_ok());
        assert!(coordinator.power_cut);

        coordinator.reenable();
        assert!(!coordinator.power_cut);
    }
}
