use tracing::warn;

use crate::Args;
use crate::config;

/// Load settings and apply command-line overrides. Config is optional;
/// failures fall back to defaults rather than preventing startup.
pub fn load_settings(args: &Args) -> config::Settings {
    let mut settings = match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => s,
            Err(msg) => {
                warn!(%msg, "invalid config, using defaults");
                config::Settings::default()
            }
        },
        Err(err) => {
            warn!(%err, "failed to load config, using defaults");
            config::Settings::default()
        }
    };

    if let Some(mount_point) = &args.mount_point {
        settings.media.mount_point = mount_point.clone();
    }
    settings
}
