//! # List Module
//!
//! The ordered row list and its selection.
//!
//! Selection is a set of row indices. Removing rows re-maps the surviving
//! selected indices so they keep pointing at the same entries.

use crate::core::model::Entry;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Rows shown in the list region plus the current selection
#[derive(Debug, Clone, Default)]
pub struct ListState {
    entries: Vec<Entry>,
    selection: BTreeSet<usize>,
    directory: Option<PathBuf>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory the rows belong to
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = Some(directory.into());
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Replace every row at once; selection is cleared
    pub fn replace_all(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.selection.clear();
    }

    /// Drop every row and the selection
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Remove rows in one batch and return them in list order.
    ///
    /// Out-of-range and repeated indices are ignored. Surviving selected
    /// rows stay selected. Group boundary flags describe membership at scan
    /// time and are left as they were.
    pub fn remove(&mut self, indices: impl IntoIterator<Item = usize>) -> Vec<Entry> {
        let doomed: BTreeSet<usize> = indices
            .into_iter()
            .filter(|&i| i < self.entries.len())
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        // Each survivor moves up by the number of removed rows before it.
        self.selection = self
            .selection
            .iter()
            .copied()
            .filter(|i| !doomed.contains(i))
            .map(|i| i - doomed.range(..i).count())
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        let mut kept = Vec::with_capacity(self.entries.len() - doomed.len());
        for (index, entry) in self.entries.drain(..).enumerate() {
            if doomed.contains(&index) {
                removed.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        removed
    }

    /// Replace the selection. Out-of-range indices are ignored.
    pub fn select(&mut self, indices: impl IntoIterator<Item = usize>) {
        let len = self.entries.len();
        self.selection = indices.into_iter().filter(|&i| i < len).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(&index)
    }

    /// Selected row indices in ascending order
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    /// The selected entry when exactly one row is selected
    pub fn single_selected(&self) -> Option<&Entry> {
        match self.selection.len() {
            1 => self
                .selection
                .iter()
                .next()
                .and_then(|&i| self.entries.get(i)),
            _ => None,
        }
    }

    /// Label for the status region.
    ///
    /// One selected row shows its path, no selection shows the directory,
    /// anything more shows the count.
    pub fn active_label(&self) -> String {
        if let Some(entry) = self.single_selected() {
            return entry.path().display().to_string();
        }
        match self.selection.len() {
            0 => self.directory_label(),
            count => format!("{} selected", count),
        }
    }

    /// Label used when nothing is selected
    pub fn directory_label(&self) -> String {
        self.directory
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Row index of the entry for `path`
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path() == path)
    }
}
