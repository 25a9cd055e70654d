//! # File Operations Module
//!
//! The narrow file-system contract the coordinator needs: existence
//! check, reversible delete (trash) and open-with-default-handler.

use crate::error::FileOpError;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// File-system collaborator
pub trait FileOperations: Send + Sync {
    /// Whether the file is still present
    fn exists(&self, path: &Path) -> bool;

    /// Move the file to the trash / recycle bin
    fn trash(&self, path: &Path) -> Result<(), FileOpError>;

    /// Open the file with the platform's default application
    fn open_default(&self, path: &Path) -> Result<(), FileOpError>;
}

/// Real file operations backed by the `trash` crate and the platform opener
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileOperations;

impl SystemFileOperations {
    #[cfg(target_os = "macos")]
    fn opener(path: &Path) -> Command {
        let mut command = Command::new("open");
        command.arg(path);
        command
    }

    #[cfg(target_os = "windows")]
    fn opener(path: &Path) -> Command {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn opener(path: &Path) -> Command {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}

/// Wait for a spawned opener on a background thread so it does not linger
/// as a zombie in a long-lived process.
fn reap(mut child: Child) -> std::io::Result<JoinHandle<Option<ExitStatus>>> {
    thread::Builder::new()
        .name("opener-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => Some(status),
            Err(e) => {
                debug!("Could not wait for opener: {}", e);
                None
            }
        })
}

impl FileOperations for SystemFileOperations {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn trash(&self, path: &Path) -> Result<(), FileOpError> {
        trash::delete(path).map_err(|e| FileOpError::Trash {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn open_default(&self, path: &Path) -> Result<(), FileOpError> {
        // The opener returns immediately; the application it launches is
        // not our child.
        let child = Self::opener(path).spawn().map_err(|e| FileOpError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if let Err(e) = reap(child) {
            debug!("Opener for {} left unreaped: {}", path.display(), e);
        }
        Ok(())
    }
}
