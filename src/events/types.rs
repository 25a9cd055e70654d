//! Event type definitions for observing the browser core.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the browser core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scan lifecycle
    Scan(ScanEvent),
    /// Thumbnail generation and delivery
    Thumbnail(ThumbnailEvent),
    /// Entry list mutations
    List(ListEvent),
    /// Selection changes as reported to the status region
    Selection(SelectionEvent),
    /// Trash-removal of selected files
    Delete(DeleteEvent),
}

/// Events from the directory scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// A scan was started; older epochs are now stale
    Started { directory: PathBuf, epoch: u64 },
    /// The current scan finished and its entries were applied
    Completed {
        directory: PathBuf,
        epoch: u64,
        groups: usize,
        entries: usize,
    },
    /// A result from a superseded scan arrived and was dropped
    Superseded { epoch: u64, current: u64 },
    /// Detection failed; the list stays empty
    Failed { directory: PathBuf, message: String },
}

/// Events from the thumbnail pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThumbnailEvent {
    /// A new generation was started for a key
    Requested { path: PathBuf },
    /// A request was answered from the store
    CacheHit { path: PathBuf },
    /// A request attached to a generation already in flight
    Joined { path: PathBuf },
    /// Generation succeeded and the image was stored
    Generated { path: PathBuf },
    /// Generation failed; the key stays uncached
    Failed { path: PathBuf, message: String },
    /// A delivery arrived for a slot that had been rebound
    StaleDropped { path: PathBuf },
}

/// Events from the entry list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ListEvent {
    /// The list was replaced wholesale
    Replaced { entries: usize },
    /// Entries were removed in one batch
    Removed { removed: usize, remaining: usize },
    /// An entry was dropped because its file no longer exists
    Vanished { path: PathBuf },
}

/// Status-region updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// Label and count shown by the status region
    Changed { label: String, count: usize },
}

/// Events from batch deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeleteEvent {
    /// A file was moved to the trash
    Trashed { path: PathBuf },
    /// A file could not be moved; the batch continues
    Failed { path: PathBuf, message: String },
    /// The batch finished and targeted rows were removed
    Completed { trashed: usize, failed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Scan(ScanEvent::Completed {
            directory: PathBuf::from("/photos"),
            epoch: 3,
            groups: 2,
            entries: 5,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Scan(ScanEvent::Completed { epoch, entries, .. }) => {
                assert_eq!(epoch, 3);
                assert_eq!(entries, 5);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn delete_failure_keeps_message() {
        let event = Event::Delete(DeleteEvent::Failed {
            path: PathBuf::from("/photos/x.jpg"),
            message: "permission denied".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("permission denied"));
        assert!(json.contains("x.jpg"));
    }
}
