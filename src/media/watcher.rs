//! Mount observer thread.
//!
//! Reports physical truth as discrete edges into the control queue. Policy
//! (the manual-eject suppression) lives in the controller; the watcher only
//! consults the shared flag to decide whether a mount edge may take effect
//! yet.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{MediaSettings, MountProbe};
use crate::input::{ControlEvent, EventSender};

use super::scan::scan;

/// OS-level mount truth for the configured mount point, independent of the
/// controller's `ManuallyEjected` policy state.
pub fn is_mounted(settings: &MediaSettings) -> bool {
    match settings.mount_probe {
        MountProbe::Procfs => procfs_has_mount(&settings.mount_point),
        MountProbe::PathExists => settings.mount_point.is_dir(),
    }
}

fn procfs_has_mount(mount_point: &Path) -> bool {
    let Ok(mounts) = std::fs::read_to_string("/proc/mounts") else {
        return false;
    };
    let needle = mount_point.to_string_lossy();
    mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|mp| mp == needle)
}

/// Spawn the mount observer.
///
/// Emits `MountAppeared` with a freshly scanned playlist on a rising edge
/// and `MountDisappeared` on a falling edge. While `suppressed` is set a
/// rising edge is left unconsumed, so the mount is reported on the first
/// poll after re-enable rather than being lost. The thread exits when the
/// control queue goes away.
pub fn spawn(
    settings: MediaSettings,
    events: EventSender,
    suppressed: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let interval = Duration::from_millis(settings.poll_interval_ms);
        let mut was_mounted = false;

        loop {
            let mounted = is_mounted(&settings);

            if mounted && !was_mounted {
                if suppressed.load(Ordering::SeqCst) {
                    debug!("mount detected while ejected; holding until re-enable");
                } else {
                    info!(mount_point = %settings.mount_point.display(), "mount appeared");
                    let playlist = scan(&settings.mount_point, &settings);
                    if events.send(ControlEvent::MountAppeared(playlist)).is_err() {
                        break;
                    }
                    was_mounted = true;
                }
            } else if !mounted && was_mounted {
                info!(mount_point = %settings.mount_point.display(), "mount disappeared");
                if events.send(ControlEvent::MountDisappeared).is_err() {
                    break;
                }
                was_mounted = false;
            }

            thread::sleep(interval);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input;
    use std::fs;
    use tempfile::tempdir;

    fn test_settings(mount_point: std::path::PathBuf) -> MediaSettings {
        MediaSettings {
            mount_point,
            mount_probe: MountProbe::PathExists,
            poll_interval_ms: 10,
            ..MediaSettings::default()
        }
    }

    #[test]
    fn watcher_emits_mount_edges() {
        let dir = tempdir().unwrap();
        let mount = dir.path().join("usb");
        let (tx, rx) = input::channel(16);
        let suppressed = Arc::new(AtomicBool::new(false));
        let _watcher = spawn(test_settings(mount.clone()), tx, suppressed);

        // Stage the content first, then rename into place so the watcher
        // cannot observe a half-populated mount.
        let staging = dir.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("a.mp3"), b"not real").unwrap();
        fs::rename(&staging, &mount).unwrap();

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            ControlEvent::MountAppeared(playlist) => assert_eq!(playlist.len(), 1),
            other => panic!("expected MountAppeared, got {other:?}"),
        }

        fs::remove_dir_all(&mount).unwrap();
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            ControlEvent::MountDisappeared => {}
            other => panic!("expected MountDisappeared, got {other:?}"),
        }
    }

    #[test]
    fn suppressed_mount_edge_is_held_until_reenable() {
        let dir = tempdir().unwrap();
        let mount = dir.path().join("usb");
        let (tx, rx) = input::channel(16);
        let suppressed = Arc::new(AtomicBool::new(true));
        let _watcher = spawn(test_settings(mount.clone()), tx, suppressed.clone());

        fs::create_dir_all(&mount).unwrap();
        assert!(
            rx.recv_timeout(Duration::from_millis(300)).is_err(),
            "suppressed watcher must not emit a mount event"
        );

        suppressed.store(false, Ordering::SeqCst);
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            ControlEvent::MountAppeared(_) => {}
            other => panic!("expected held MountAppeared, got {other:?}"),
        }
    }

    #[test]
    fn is_mounted_path_probe_tracks_directory_presence() {
        let dir = tempdir().unwrap();
        let mount = dir.path().join("usb");
        let settings = test_settings(mount.clone());

        assert!(!is_mounted(&settings));
        fs::create_dir_all(&mount).unwrap();
        assert!(is_mounted(&settings));
    }
}
