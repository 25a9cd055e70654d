//! Commands sent by display regions to the coordinator.

use crate::core::thumbnail::SlotId;
use crossbeam_channel::Sender;
use std::path::PathBuf;

/// A request from a display region, applied in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenDirectory(PathBuf),
    /// Replace the selection with these rows
    Select(Vec<usize>),
    DeleteSelected,
    /// Delete the clicked row, or the whole selection if it is part of it
    DeleteRow(usize),
    /// Open a row with the default application
    OpenEntry(usize),
    /// The preview region went off screen
    HidePreview,
    /// Open the file behind the "preview unavailable" placeholder
    OpenExternally,
    BindThumbnail { slot: SlotId, row: usize },
    UnbindThumbnail(SlotId),
}

/// What a display region holds instead of a reference to its siblings.
///
/// Cloneable and `Send`; commands queue up until the owner of the
/// coordinator calls `process_pending`.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: Sender<Command>,
}

impl CoordinatorHandle {
    pub(crate) fn new(sender: Sender<Command>) -> Self {
        Self { sender }
    }

    /// Queue a command. Dropped silently once the coordinator is gone.
    pub fn send(&self, command: Command) {
        let _ = self.sender.send(command);
    }

    pub fn open_directory(&self, directory: impl Into<PathBuf>) {
        self.send(Command::OpenDirectory(directory.into()));
    }

    pub fn select(&self, rows: impl IntoIterator<Item = usize>) {
        self.send(Command::Select(rows.into_iter().collect()));
    }

    pub fn delete_selected_files(&self) {
        self.send(Command::DeleteSelected);
    }

    pub fn delete_row(&self, row: usize) {
        self.send(Command::DeleteRow(row));
    }

    pub fn open_entry(&self, row: usize) {
        self.send(Command::OpenEntry(row));
    }

    pub fn hide_preview(&self) {
        self.send(Command::HidePreview);
    }

    pub fn open_externally(&self) {
        self.send(Command::OpenExternally);
    }

    pub fn bind_thumbnail(&self, slot: SlotId, row: usize) {
        self.send(Command::BindThumbnail { slot, row });
    }

    pub fn unbind_thumbnail(&self, slot: SlotId) {
        self.send(Command::UnbindThumbnail(slot));
    }
}
