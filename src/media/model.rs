use std::path::PathBuf;
use std::time::Duration;

/// One playable file enumerated from the removable medium.
///
/// Immutable once enumerated; the whole set is rebuilt on every fresh mount.
#[derive(Clone, Debug)]
pub struct Track {
    pub path: PathBuf,
    /// Tag title when the file carries one, file stem otherwise.
    /// Display only; identity is the path.
    pub title: String,
    pub duration: Option<Duration>,
}
