//! Keyboard stand-in for the physical controls (interactive sessions).
//!
//! On the real appliance a GPIO input layer delivers the same `InputEvent`s
//! already debounced; this backend lets the controller be exercised from a
//! terminal without the hardware.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::debug;

use crate::config::InputSettings;

use super::queue::EventSender;
use super::types::{ControlEvent, InputEvent};

/// Spawn the keyboard observer thread.
///
/// Key map: space/`p` play-pause, `n`/`l` next, `b`/`h` previous,
/// `+`/`=`/`-` volume by `volume_step`, `e` encoder press (eject toggle),
/// `q` shutdown. The caller is responsible for raw mode.
pub fn spawn_keyboard(
    settings: InputSettings,
    volume_step: i32,
    events: EventSender,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let poll = Duration::from_millis(settings.poll_interval_ms);

        loop {
            match event::poll(poll) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    debug!(%err, "keyboard poll failed; stopping input thread");
                    break;
                }
            }
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let semantic = match key.code {
                KeyCode::Char(' ') | KeyCode::Char('p') => Some(InputEvent::PlayPause),
                KeyCode::Char('n') | KeyCode::Char('l') => Some(InputEvent::Next),
                KeyCode::Char('b') | KeyCode::Char('h') => Some(InputEvent::Previous),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    Some(InputEvent::VolumeDelta(volume_step))
                }
                KeyCode::Char('-') => Some(InputEvent::VolumeDelta(-volume_step)),
                KeyCode::Char('e') => Some(InputEvent::EncoderPress),
                KeyCode::Char('q') | KeyCode::Esc => {
                    let _ = events.send(ControlEvent::Shutdown);
                    break;
                }
                _ => None,
            };

            if let Some(input) = semantic {
                if events.send(ControlEvent::Input(input)).is_err() {
                    break;
                }
            }
        }
    })
}
