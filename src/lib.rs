//! # Duplicate Browser
//!
//! Presentation-state core for browsing duplicate files.
//!
//! ## What it keeps consistent
//! - **The list** - duplicate groups flattened into rows, with a selection
//! - **The preview** - exactly one entry previewed, at most one video playing
//! - **The status** - a label and count that always match the selection
//! - **Thumbnails** - generated in the background, never applied to a row
//!   that has moved on
//!
//! ## Architecture
//! - `core` - The state machine and its collaborators (GUI-agnostic)
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//!
//! The `dupe-browse` binary is a terminal shell over the same seam a GUI
//! would use.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{BrowserBuilder, BrowserConfig, SelectionCoordinator};
pub use error::{BrowserError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Calling it
/// twice keeps the first subscriber.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global tracing subscriber already set");
    }
}
