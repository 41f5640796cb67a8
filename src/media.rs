//! Removable-medium handling: track model, playlist enumeration and the
//! mount watcher that reports mount/unmount edges to the control loop.

mod model;
mod scan;
pub mod watcher;

pub use model::Track;
pub use scan::scan;
pub use watcher::is_mounted;
