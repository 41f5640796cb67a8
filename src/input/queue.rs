//! Bounded single-consumer control queue.
//!
//! Producers never block the thread they run on: when the queue is full the
//! oldest queued event is discarded (and logged) to make room. Events are
//! not precious; a stale button press is worth less than a fresh one.

use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use thiserror::Error;
use tracing::warn;

use super::types::ControlEvent;

/// Create the control queue with the given capacity.
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = bounded(capacity);
    let alive = Arc::new(());
    (
        EventSender {
            tx,
            drain: rx.clone(),
            alive: Arc::downgrade(&alive),
        },
        EventReceiver { rx, _alive: alive },
    )
}

/// The control loop side of the queue is gone; producers should wind down.
#[derive(Debug, Error)]
#[error("control event queue disconnected")]
pub struct QueueClosed;

#[derive(Clone)]
pub struct EventSender {
    tx: Sender<ControlEvent>,
    /// Cloned receiver used only to discard the oldest event on overflow;
    /// it deliberately does not count as a live consumer.
    drain: Receiver<ControlEvent>,
    alive: Weak<()>,
}

impl EventSender {
    /// Enqueue without blocking. On overflow the oldest queued event is
    /// dropped; `Err` means the consumer is gone for good.
    pub fn send(&self, event: ControlEvent) -> Result<(), QueueClosed> {
        let mut event = event;
        loop {
            if self.alive.upgrade().is_none() {
                return Err(QueueClosed);
            }
            match self.tx.try_send(event) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    if let Ok(dropped) = self.drain.try_recv() {
                        warn!(?dropped, "control queue full; dropping oldest event");
                    }
                    event = returned;
                }
                Err(TrySendError::Disconnected(_)) => return Err(QueueClosed),
            }
        }
    }
}

pub struct EventReceiver {
    rx: Receiver<ControlEvent>,
    _alive: Arc<()>,
}

impl EventReceiver {
    /// Wait for the next event, up to `timeout`. `Timeout` is the control
    /// loop's idle tick; `Disconnected` means every producer is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ControlEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}
