//! crossbeam-backed event channel.
//!
//! Sending never blocks: the coordinator emits from the foreground and a
//! slow observer must not stall it. When a bounded channel is full the
//! event is dropped and counted instead.

use super::Event;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable, non-blocking event sink shared by the foreground and workers
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
    dropped: Arc<AtomicUsize>,
}

impl EventSender {
    pub fn new(tx: Sender<Event>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Emit an event.
    ///
    /// A full channel drops the event; a disconnected one (nobody
    /// listening) discards it without counting.
    pub fn send(&self, event: Event) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Events lost because the observer fell behind
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("queued", &self.tx.len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// Observer side of an event channel
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Next event; `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    /// Next event if one arrives within `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now, oldest first
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Blocking iterator that ends when every sender is gone
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.rx.iter()
    }
}

/// Event channel constructors
pub struct EventChannel;

impl EventChannel {
    /// Channel that never drops events
    pub fn new() -> (EventSender, EventReceiver) {
        Self::wrap(crossbeam_channel::unbounded())
    }

    /// Channel holding at most `capacity` undelivered events
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        Self::wrap(crossbeam_channel::bounded(capacity))
    }

    fn wrap((tx, rx): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
        (EventSender::new(tx), EventReceiver { rx })
    }
}

/// Sender whose events go nowhere; the default for every component.
pub fn null_sender() -> EventSender {
    let (tx, _) = crossbeam_channel::bounded(0);
    EventSender::new(tx)
}
