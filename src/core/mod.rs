//! # Core Module
//!
//! The GUI-agnostic presentation state of the duplicate browser.
//!
//! ## Modules
//! - `model` - Entries and duplicate groups
//! - `detector` - Finds duplicate groups in a directory
//! - `scan` - Runs the detector in the background, epoch-tagged
//! - `list` - Ordered rows and the selection
//! - `thumbnail` - Row thumbnails, generated off the foreground and memoized
//! - `preview` - Content-type driven preview of a single entry
//! - `fileops` - Trash, open and existence checks
//! - `coordinator` - The mediator tying the regions together

pub mod coordinator;
pub mod detector;
pub mod fileops;
pub mod list;
pub mod model;
pub mod preview;
pub mod scan;
pub mod thumbnail;

// Re-export commonly used types
pub use coordinator::{
    BrowserBuilder, BrowserConfig, CoordinatorHandle, DeleteReport, SelectionCoordinator,
    StatusUpdate,
};
pub use list::ListState;
pub use model::{ContentType, DuplicateGroup, Entry, FoundFile};
pub use preview::Preview;
