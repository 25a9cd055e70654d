//! # Events Module
//!
//! Structured notifications about what the browser core is doing: scans
//! starting and landing, thumbnails generated or dropped as stale, rows
//! removed, files trashed.
//!
//! Every component holds an [`EventSender`] that defaults to
//! [`null_sender`]. Observing is optional and never slows the core down;
//! see [`EventChannel::bounded`] for what happens to a lagging observer.
//!
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut browser = SelectionCoordinator::builder().events(sender).build()?;
//! browser.open_directory("/Users/me/Downloads");
//!
//! while let Some(event) = receiver.recv_timeout(Duration::from_secs(1)) {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::{DeleteEvent, Event, ListEvent, ScanEvent, SelectionEvent, ThumbnailEvent};
