//! Input event source: semantic control events and the bounded queue that
//! serializes every asynchronous producer into the single control loop.

mod keyboard;
mod queue;
mod types;

pub use keyboard::spawn_keyboard;
pub use queue::{EventReceiver, EventSender, QueueClosed, channel};
pub use types::{ControlEvent, InputEvent};
